#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use kbase_core::traits::{Embedder, TextGenerator};
use kbase_core::types::ArticleRecord;
use kbase_embed::HashEmbedder;
use kbase_engine::{EngineOptions, RetrievalEngine};

pub const DIM: usize = 1024;

pub fn five_articles() -> Vec<ArticleRecord> {
    vec![
        ArticleRecord::new("Password Reset", "Open the login screen and choose forgot credentials to receive a recovery email.")
            .with_category("Account")
            .with_tags(["login", "security"])
            .with_source("password.json"),
        ArticleRecord::new("Billing Invoices", "Download monthly statements and update the credit card on file.")
            .with_category("Billing")
            .with_source("billing.json"),
        ArticleRecord::new("Keyboard Shortcuts", "Press question mark to list hotkeys for archiving and navigation.")
            .with_source("shortcuts.json"),
        ArticleRecord::new("Shared Inbox Setup", "Connect a team mailbox so colleagues can collaborate on incoming conversations.")
            .with_category("Email")
            .with_tags(["team"])
            .with_source("inbox.json"),
        ArticleRecord::new("Mobile Application", "Install the iOS or Android client to triage tickets while travelling.")
            .with_source("mobile.json"),
    ]
}

pub fn three_articles() -> Vec<ArticleRecord> {
    five_articles().into_iter().take(3).collect()
}

pub fn engine_with(records: &Vec<ArticleRecord>, generator: Option<Box<dyn TextGenerator>>) -> RetrievalEngine {
    RetrievalEngine::build(records, Box::new(HashEmbedder::new(DIM)), generator, EngineOptions::default()).expect("engine")
}

/// Wraps an embedder and counts `embed_batch` calls.
pub struct CountingEmbedder {
    inner: HashEmbedder,
    pub calls: Arc<AtomicUsize>,
}

impl CountingEmbedder {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { inner: HashEmbedder::new(DIM), calls: Arc::clone(&calls) }, calls)
    }
}

impl Embedder for CountingEmbedder {
    fn dim(&self) -> usize { self.inner.dim() }
    fn model_name(&self) -> &str { "counting" }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

/// Claims one dimension but produces another.
pub struct LyingEmbedder;

impl Embedder for LyingEmbedder {
    fn dim(&self) -> usize { 8 }
    fn model_name(&self) -> &str { "lying" }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.5; 4]).collect())
    }
}

pub enum Behaviour {
    Reply(String),
    Fail,
    Hang,
}

/// Scripted generator that records the context it was handed.
pub struct ScriptedGenerator {
    behaviour: Behaviour,
    pub seen_context: Arc<std::sync::Mutex<Option<String>>>,
}

impl ScriptedGenerator {
    pub fn new(behaviour: Behaviour) -> (Self, Arc<std::sync::Mutex<Option<String>>>) {
        let seen = Arc::new(std::sync::Mutex::new(None));
        (Self { behaviour, seen_context: Arc::clone(&seen) }, seen)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str { "scripted" }

    async fn generate(&self, _query: &str, context: &str) -> anyhow::Result<String> {
        *self.seen_context.lock().unwrap() = Some(context.to_string());
        match &self.behaviour {
            Behaviour::Reply(text) => Ok(text.clone()),
            Behaviour::Fail => Err(anyhow::anyhow!("upstream returned 503")),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".to_string())
            }
        }
    }
}
