use std::time::Duration;

use async_trait::async_trait;
use evidex_core::errors::EvidexResult;
use evidex_core::traits::ITextGenerator;

use super::failure;

/// Returns a fixed response, optionally after a delay.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    response: String,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ITextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> EvidexResult<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "scripted_generator"
    }
}

/// Every call fails.
#[derive(Debug, Default)]
pub struct FailingGenerator;

#[async_trait]
impl ITextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> EvidexResult<String> {
        Err(failure("failing_generator", "model overloaded"))
    }

    fn name(&self) -> &str {
        "failing_generator"
    }
}
