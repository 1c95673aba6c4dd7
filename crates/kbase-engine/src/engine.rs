use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::{debug, info, warn};

use kbase_core::config::{SearchSettings, Settings};
use kbase_core::corpus::load_documents;
use kbase_core::traits::{CorpusSource, Embedder, TextGenerator};
use kbase_core::types::{HealthStatus, IndexStats, QueryRequest, QueryResponse, RetrievalResult};
use kbase_core::{Error, Result};
use kbase_index::FlatL2Index;

use crate::answer::{build_context, extractive_answer, summarize, NO_RESULTS_ANSWER};
use crate::confidence::score_confidence;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub search: SearchSettings,
    pub generation_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { search: SearchSettings::default(), generation_timeout: Duration::from_secs(30) }
    }
}

impl EngineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self { search: settings.search.clone(), generation_timeout: settings.generation.timeout() }
    }
}

/// Retrieval orchestrator. A value of this type is always fully indexed:
/// construction either loads, embeds and indexes the whole corpus or fails.
/// After that it is read-only and can be shared across threads.
pub struct RetrievalEngine {
    embedder: Box<dyn Embedder>,
    index: FlatL2Index,
    generator: Option<Box<dyn TextGenerator>>,
    options: EngineOptions,
}

impl RetrievalEngine {
    pub fn build(
        source: &dyn CorpusSource,
        embedder: Box<dyn Embedder>,
        generator: Option<Box<dyn TextGenerator>>,
        options: EngineOptions,
    ) -> Result<Self> {
        let start = Instant::now();
        info!("Loading knowledge base from {}", source.describe());
        let documents = load_documents(source)?;

        info!("Generating embeddings for {} articles with {}", documents.len(), embedder.model_name());
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).map_err(Error::Embedding)?;

        let mut index = FlatL2Index::new(embedder.dim());
        index.add(vectors, documents)?;
        info!("✅ Indexed {} articles (dim={}) in {:?}", index.len(), index.dim(), start.elapsed());

        Ok(Self { embedder, index, generator, options })
    }

    pub fn len(&self) -> usize { self.index.len() }

    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    pub fn index(&self) -> &FlatL2Index { &self.index }

    pub fn generation_configured(&self) -> bool { self.generator.is_some() }

    /// Embeds `query` and returns its `k` nearest articles. Callers are
    /// expected to have rejected blank queries and non-positive `k`.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        let query_vec = self
            .embedder
            .embed_batch(&[query.to_string()])
            .map_err(Error::Embedding)?
            .pop()
            .ok_or_else(|| Error::Embedding(anyhow!("embedder returned no vector for the query")))?;
        self.index.search(&query_vec, k)
    }

    pub fn score_confidence(&self, results: &[RetrievalResult]) -> f32 {
        score_confidence(results)
    }

    /// Phrases an answer. Generation is attempted once when requested and
    /// configured; any failure, timeout or empty completion falls back to
    /// the extractive answer.
    pub async fn answer(&self, query: &str, results: &[RetrievalResult], use_generation: bool) -> String {
        if results.is_empty() {
            return NO_RESULTS_ANSWER.to_string();
        }
        if use_generation {
            match &self.generator {
                Some(generator) => {
                    if let Some(text) = self.try_generate(generator.as_ref(), query, results).await {
                        return text;
                    }
                }
                None => debug!("Generation requested but not configured, answering extractively"),
            }
        }
        extractive_answer(results)
    }

    async fn try_generate(&self, generator: &dyn TextGenerator, query: &str, results: &[RetrievalResult]) -> Option<String> {
        let context = build_context(results);
        match tokio::time::timeout(self.options.generation_timeout, generator.generate(query, &context)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
            Ok(Ok(_)) => {
                warn!("{} returned an empty completion, using extractive answer", generator.name());
                None
            }
            Ok(Err(e)) => {
                warn!("{} failed: {:#}; using extractive answer", generator.name(), e);
                None
            }
            Err(_) => {
                warn!("{} timed out after {:?}; using extractive answer", generator.name(), self.options.generation_timeout);
                None
            }
        }
    }

    /// Validated query boundary: rejects blank text and out-of-range `k`
    /// before touching the embedder or the index.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let text = request.query.trim();
        if text.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let k = self.options.search.validate_k(request.k)?;

        debug!("Processing query {:?} (k={}, generate={})", text, k, request.generate);
        let results = self.retrieve(text, k)?;
        let confidence_score = self.score_confidence(&results);
        let answer = self.answer(text, &results, request.generate).await;

        Ok(QueryResponse {
            query: request.query.clone(),
            retrieved_articles: results.iter().map(summarize).collect(),
            answer,
            confidence_score,
            num_retrieved: results.len(),
        })
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.index.len(),
            embedding_dimension: self.embedder.dim(),
            model_name: self.embedder.model_name().to_string(),
        }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus { engine_initialized: true, generation_configured: self.generation_configured() }
    }
}
