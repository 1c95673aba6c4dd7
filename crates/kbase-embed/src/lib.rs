//! kbase-embed
//!
//! Text embedders behind `kbase_core::traits::Embedder`: a candle-based
//! sentence-transformers encoder and a hashing embedder for tests.

use std::path::{Path, PathBuf};

use tracing::info;

use kbase_core::config::{resolve_with_base, EmbeddingSettings};
use kbase_core::traits::Embedder;
use kbase_core::{Error, Result};

pub mod device;
pub mod hash;
pub mod minilm;
pub mod pool;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use minilm::MiniLmEmbedder;
pub use pool::masked_mean_l2;

/// Picks the embedder described by `settings`. `APP_USE_FAKE_EMBEDDINGS=1`
/// forces the hashing embedder regardless of configuration.
pub fn load_embedder(settings: &EmbeddingSettings, base_dir: &Path) -> Result<Box<dyn Embedder>> {
    if settings.use_fake || fake_requested_by_env() {
        info!("🧪 Using HashEmbedder (dim={})", settings.fake_dim);
        return Ok(Box::new(HashEmbedder::new(settings.fake_dim)));
    }
    let model_dir = resolve_model_dir(settings, base_dir)?;
    let model = MiniLmEmbedder::load(&model_dir, &settings.model_name, settings.max_len, settings.batch_size)
        .map_err(|e| Error::ModelLoad(format!("{}: {:#}", model_dir.display(), e)))?;
    Ok(Box::new(model))
}

fn fake_requested_by_env() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

fn resolve_model_dir(settings: &EmbeddingSettings, base_dir: &Path) -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() { info!("📦 Using {}: {}", var, p.display()); return Ok(p); }
        }
    }
    let configured = resolve_with_base(base_dir, &settings.model_dir);
    if configured.exists() { info!("📦 Using model dir: {}", configured.display()); return Ok(configured); }
    Err(Error::ModelLoad(format!("Could not locate model directory {}", configured.display())))
}
