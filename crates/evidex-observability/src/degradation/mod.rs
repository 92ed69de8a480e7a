//! Degradation tracking across retrieval calls.

pub mod tracker;

pub use tracker::{DegradationTracker, RecoveryStatus, TrackedDegradation};
