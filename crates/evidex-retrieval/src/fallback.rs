//! Shared plumbing for calling collaborators and absorbing their failures.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use evidex_core::errors::{EvidexResult, ProviderError};
use evidex_core::models::{DegradationEvent, RetrievalContext};
use evidex_observability::tracing_setup::events;

/// Run a collaborator call with an upper bound on its duration.
pub(crate) async fn bounded<T>(
    provider: &str,
    timeout_ms: u64,
    call: impl Future<Output = EvidexResult<T>>,
) -> EvidexResult<T> {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            provider: provider.to_string(),
            timeout_ms,
        }
        .into()),
    }
}

/// Log a fallback and record it on the context.
pub(crate) fn degrade(
    ctx: &mut RetrievalContext,
    component: &str,
    failure: impl Display,
    fallback_used: &str,
) {
    let failure = failure.to_string();
    events::degradation_triggered(component, &failure, fallback_used);
    ctx.record_degradation(DegradationEvent::new(component, failure, fallback_used));
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidex_core::errors::EvidexError;

    #[tokio::test]
    async fn bounded_passes_through_result() {
        let out = bounded("p", 1_000, async { Ok::<_, EvidexError>(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_maps_elapsed_to_timeout() {
        let out: EvidexResult<()> = bounded("slow", 50, async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        match out {
            Err(EvidexError::ProviderError(ProviderError::Timeout { provider, timeout_ms })) => {
                assert_eq!(provider, "slow");
                assert_eq!(timeout_ms, 50);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn degrade_records_event() {
        let mut ctx = RetrievalContext::new("q");
        degrade(&mut ctx, "reranking", "scorer down", "unscored truncation");
        assert_eq!(ctx.degradations.len(), 1);
        assert_eq!(ctx.degradations[0].fallback_used, "unscored truncation");
    }
}
