//! OpenAI-compatible chat-completions client used to phrase answers.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use kbase_core::config::GenerationSettings;
use kbase_core::traits::TextGenerator;

const SYSTEM_PROMPT: &str = "You are a support assistant for a product knowledge base. \
Answer the user's question using only the provided knowledge base articles. \
Be concise, accurate and helpful. If the articles do not contain the answer, say so.";

pub struct OpenAiChatGenerator {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiChatGenerator {
    pub fn new(settings: &GenerationSettings, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.into(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            client,
        })
    }

    /// Builds a generator when generation is enabled and an API key is
    /// available; `None` means answers stay extractive.
    pub fn from_settings(settings: &GenerationSettings) -> Result<Option<Self>> {
        if !settings.enabled {
            info!("Answer generation disabled by configuration");
            return Ok(None);
        }
        match settings.resolved_api_key() {
            Some(key) => Ok(Some(Self::new(settings, key)?)),
            None => {
                info!("No API key configured, answer generation unavailable");
                Ok(None)
            }
        }
    }

    fn user_prompt(query: &str, context: &str) -> String {
        format!(
            "Based on the following knowledge base articles, answer this question:\n\n\
             Question: {query}\n\n\
             Knowledge Base Articles:\n{context}\n\n\
             Please provide a clear and helpful answer."
        )
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, query: &str, context: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::user_prompt(query, context) },
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} (model={})", url, self.model);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connection to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("completion API error {}: {}", status, text);
        }

        let json: Value = resp.json().await.context("decoding completion response")?;
        let content = json["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| anyhow!("no message content in completion response"))?;
        Ok(content.trim().to_string())
    }
}
