//! Per-stage wall-clock timing for one retrieval call.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Time spent in one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    pub name: String,
    pub duration_ms: f64,
}

/// Timing of a whole call, stored under `stage_metadata["timing"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    pub stages: Vec<StageTiming>,
    pub stage_count: usize,
    pub total_duration_ms: f64,
}

/// Collects stage timings from the start of a call.
#[derive(Debug)]
pub struct PipelineTimer {
    started: Instant,
    stages: Vec<StageTiming>,
}

impl PipelineTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stages: Vec::new(),
        }
    }

    /// Record a stage that took `elapsed`. Returns the duration in ms.
    pub fn record(&mut self, name: &str, elapsed: Duration) -> f64 {
        let duration_ms = to_ms(elapsed);
        self.stages.push(StageTiming {
            name: name.to_string(),
            duration_ms,
        });
        duration_ms
    }

    /// Wall-clock time since `start`.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn summary(&self) -> TimingSummary {
        TimingSummary {
            stages: self.stages.clone(),
            stage_count: self.stages.len(),
            total_duration_ms: to_ms(self.elapsed()),
        }
    }
}

fn to_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_stages_in_record_order() {
        let mut timer = PipelineTimer::start();
        timer.record("a", Duration::from_millis(2));
        timer.record("b", Duration::from_micros(500));
        let summary = timer.summary();
        assert_eq!(summary.stage_count, 2);
        assert_eq!(summary.stages[0].name, "a");
        assert_eq!(summary.stages[0].duration_ms, 2.0);
        assert_eq!(summary.stages[1].duration_ms, 0.5);
    }

    #[test]
    fn summary_serializes_expected_keys() {
        let timer = PipelineTimer::start();
        let json = serde_json::to_value(timer.summary()).unwrap();
        assert!(json["stages"].is_array());
        assert_eq!(json["stage_count"], 0);
        assert!(json["total_duration_ms"].is_number());
    }
}
