use async_trait::async_trait;

use crate::errors::EvidexResult;

/// Short-text generator used for query paraphrasing.
#[async_trait]
pub trait ITextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> EvidexResult<String>;

    fn name(&self) -> &str;
}
