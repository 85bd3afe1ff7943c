use std::pin::Pin;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Incremental text produced by the generation backend.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Text-generation backend. `model` is an opaque profile name.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Blocking, whole-response completion.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String>;

    /// Incremental completion. Errors before the first byte are returned
    /// directly, later ones travel inside the stream.
    async fn stream(&self, model: &str, prompt: &str) -> Result<TextStream>;
}

/// Embedding backend used by the knowledge base.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// OpenAI-compatible chat + embeddings client (Mistral by default).
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    embed_model: String,
}

impl LlmClient {
    pub fn new(base_url: &str, api_key: Option<String>, embed_model: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
            embed_model: embed_model.to_string(),
        })
    }

    /// Resolve an API path (e.g. `chat/completions`) against the base URL.
    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/{}", base, path)
        } else {
            format!("{}/v1/{}", base, path)
        }
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        let mut req = self.client.post(self.endpoint(path)).json(body);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.send().await.context("LLM request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("LLM backend returned {}: {}", status, detail);
        }
        Ok(resp)
    }

    /// Non-streaming chat completion.
    pub async fn chat(&self, messages: &[Message], model: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        let resp = self.post("chat/completions", &body).await?;
        let text = resp.text().await.context("Failed to read LLM response")?;
        let json: serde_json::Value =
            serde_json::from_str(&text).context("Failed to parse LLM JSON")?;

        // choices[0].message.content may be null
        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .unwrap_or("")
            .to_string();

        debug!(model, len = content.len(), "completion received");
        Ok(content)
    }

    pub async fn chat_stream(&self, messages: &[Message], model: &str) -> Result<TextStream> {
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": true,
        });

        let resp = self.post("chat/completions", &body).await?;
        let events = resp.bytes_stream().eventsource();

        let deltas = events.filter_map(|result| async move {
            match result {
                Ok(event) => {
                    if event.data.trim() == "[DONE]" {
                        return None;
                    }
                    match serde_json::from_str::<serde_json::Value>(&event.data) {
                        Ok(json) => json["choices"]
                            .get(0)
                            .and_then(|c| c["delta"]["content"].as_str())
                            .filter(|s| !s.is_empty())
                            .map(|s| Ok(s.to_string())),
                        Err(e) => Some(Err(anyhow!("failed to parse stream chunk: {}", e))),
                    }
                }
                Err(e) => Some(Err(anyhow!("SSE stream error: {}", e))),
            }
        });

        Ok(Box::pin(deltas))
    }
}

#[async_trait]
impl Generator for LlmClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        self.chat(&[Message::user(prompt)], model).await
    }

    async fn stream(&self, model: &str, prompt: &str) -> Result<TextStream> {
        self.chat_stream(&[Message::user(prompt)], model).await
    }
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(vec![]);
        }
        let body = serde_json::json!({
            "model": self.embed_model,
            "input": inputs,
        });

        let resp = self.post("embeddings", &body).await?;
        let mut parsed: EmbeddingResponse =
            resp.json().await.context("Failed to parse embeddings JSON")?;

        if parsed.data.len() != inputs.len() {
            bail!(
                "embedding count mismatch: sent {}, received {}",
                inputs.len(),
                parsed.data.len()
            );
        }
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
