//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use evidex_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "EVIDEX_LOG";

/// Install the global subscriber described by `config`.
///
/// `EVIDEX_LOG` wins over `log_level` when set. JSON output carries target,
/// thread, file and line. Returns false if a global subscriber was already
/// installed.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logs {
        builder
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
            .is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
