use async_trait::async_trait;

use crate::error::Result;
use crate::types::ArticleRecord;

/// Maps texts to fixed-length dense vectors.
///
/// Implementations must return exactly one vector per input, in input order,
/// each of length `dim()`. An empty batch yields an empty result.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn model_name(&self) -> &str;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Where the engine reads its articles from at construction time.
pub trait CorpusSource {
    /// Human-readable location, used in logs and in `NoDocuments` errors.
    fn describe(&self) -> String;
    fn load(&self) -> Result<Vec<ArticleRecord>>;
}

impl CorpusSource for Vec<ArticleRecord> {
    fn describe(&self) -> String {
        "in-memory corpus".to_string()
    }

    fn load(&self) -> Result<Vec<ArticleRecord>> {
        Ok(self.clone())
    }
}

/// External text-completion capability used to phrase answers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, query: &str, context: &str) -> anyhow::Result<String>;
}
