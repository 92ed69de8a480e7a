//! # evidex-observability
//!
//! Structured tracing with span and event definitions, degradation event
//! tracking with recovery status, pipeline metrics, and per-stage timing
//! summaries for the retrieval orchestrator.

pub mod degradation;
pub mod metrics;
pub mod timing;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use metrics::PipelineMetrics;
pub use timing::{PipelineTimer, StageTiming, TimingSummary};
