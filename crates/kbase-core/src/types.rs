//! Domain types shared by the embedder, the index and the engine.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "General";

/// One structured record as it comes out of a corpus source.
///
/// `title` and `content` are required; `category` and `tags` fall back to
/// `"General"` and an empty list. `source` identifies where the record came
/// from (file name for directory sources).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl ArticleRecord {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: default_category(),
            tags: Vec::new(),
            source: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub source: String,
}

/// An indexed unit of knowledge-base content. `text` is what gets embedded
/// and what is handed back as context: the title, a blank line, the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn from_record(record: ArticleRecord) -> Self {
        let text = format!("{}\n\n{}", record.title, record.content);
        Self {
            text,
            metadata: DocumentMetadata {
                title: record.title,
                category: record.category,
                tags: record.tags,
                source: record.source,
            },
        }
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }
}

/// One hit of a nearest-neighbour query.
///
/// `distance` is the squared L2 distance to the query vector and
/// `similarity_score` is `1 / (1 + distance)`; see
/// `kbase_index::similarity_from_distance` for why that is not a probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub rank: usize,
    pub document: Document,
    pub distance: f32,
    pub similarity_score: f32,
}

/// Caller-facing query. `k` is signed so that non-positive values coming
/// off the wire can be rejected instead of wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: i64,
    #[serde(default)]
    pub generate: bool,
}

fn default_k() -> i64 {
    3
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, k: i64) -> Self {
        Self { query: query.into(), k, generate: false }
    }

    pub fn with_generation(mut self, generate: bool) -> Self {
        self.generate = generate;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub rank: usize,
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub similarity_score: f32,
    pub content_preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub retrieved_articles: Vec<ArticleSummary>,
    pub answer: String,
    pub confidence_score: f32,
    pub num_retrieved: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub embedding_dimension: usize,
    pub model_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub engine_initialized: bool,
    pub generation_configured: bool,
}
