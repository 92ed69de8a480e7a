use async_trait::async_trait;
use serde_json::Value;

use super::Dependencies;
use crate::errors::{ConfigError, EvidexResult};
use crate::models::RetrievalContext;

/// One step of the retrieval pipeline.
///
/// A stage reads only the context fields written upstream of it and writes
/// its own output field. Stages whose output is needed downstream stay
/// enabled and treat their `enabled` config flag as "pass through" instead
/// of being skipped, so every context field is populated after a full run.
#[async_trait]
pub trait IRetrievalStage: Send + Sync {
    /// Stable identifier, also the `stage` half of `stage__param` keys.
    fn name(&self) -> &str;

    /// Run the stage. Collaborator failures are absorbed here; an `Err`
    /// aborts the rest of the pipeline.
    async fn execute(&self, ctx: &mut RetrievalContext, deps: &Dependencies) -> EvidexResult<()>;

    /// Whether the orchestrator should run this stage at all.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Snapshot of the current configuration.
    fn get_config(&self) -> Value;

    /// Set one configuration parameter.
    fn update_config(&self, param: &str, value: Value) -> Result<(), ConfigError>;
}
