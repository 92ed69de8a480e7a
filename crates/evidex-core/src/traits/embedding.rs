use async_trait::async_trait;

use crate::errors::EvidexResult;

/// Text embedding function.
#[async_trait]
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> EvidexResult<Vec<f32>>;

    /// Embed a batch of texts, in order. Defaults to one `embed` per text.
    async fn embed_batch(&self, texts: &[String]) -> EvidexResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
