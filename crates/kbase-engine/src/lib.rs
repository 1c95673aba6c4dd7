//! kbase-engine
//!
//! Retrieval orchestration on top of `kbase-embed` and `kbase-index`:
//! corpus loading, query execution, confidence scoring and answer assembly.

use std::path::Path;

use kbase_core::config::{resolve_with_base, Settings};
use kbase_core::corpus::JsonDirSource;
use kbase_core::traits::TextGenerator;
use kbase_core::{Error, Result};
use kbase_embed::load_embedder;

pub mod answer;
pub mod cell;
pub mod confidence;
pub mod engine;
pub mod generation;

pub use cell::EngineCell;
pub use confidence::{score_confidence, CONFIDENCE_WEIGHTS};
pub use engine::{EngineOptions, RetrievalEngine};
pub use generation::OpenAiChatGenerator;

/// Wires the default collaborators from configuration: a JSON article
/// directory, the configured embedder and, when a key is available, the
/// chat-completions generator. Relative paths resolve against `base_dir`.
pub fn build_from_settings(settings: &Settings, base_dir: &Path) -> Result<RetrievalEngine> {
    settings.validate()?;
    let source = JsonDirSource::new(resolve_with_base(base_dir, &settings.corpus.dir));
    let embedder = load_embedder(&settings.embedding, base_dir)?;
    let generator = OpenAiChatGenerator::from_settings(&settings.generation)
        .map_err(|e| Error::InvalidConfig(format!("generation: {e:#}")))?
        .map(|g| Box::new(g) as Box<dyn TextGenerator>);
    RetrievalEngine::build(&source, embedder, generator, EngineOptions::from_settings(settings))
}
