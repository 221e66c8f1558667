//! OpenAI-compatible chat completions adapter.
//!
//! Speaks `/chat/completions` against any server exposing the OpenAI wire
//! format, using the connection details from config (`reasoning_base_url`,
//! `reasoning_api_key`, `reasoning_model`). Requests are non-streaming and
//! deterministic (temperature 0) — the evaluator wants one short answer,
//! not a conversation.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{ResearchError, Result};
use crate::eval::provider::ReasoningProvider;

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a client from the pipeline config.
    pub fn new(client: reqwest::Client, config: &PipelineConfig) -> Self {
        Self {
            client,
            base_url: config.reasoning_base_url.trim_end_matches('/').to_string(),
            api_key: config.reasoning_api_key.clone(),
            model: config.reasoning_model.clone(),
        }
    }
}

#[async_trait]
impl ReasoningProvider for ChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0.0,
        });

        debug!(model = %self.model, "requesting completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ResearchError::Http(format!("reasoning request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::Reasoning(format!(
                "status {}",
                status.as_u16()
            )));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::Parse(format!("reasoning payload: {e}")))?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ResearchError::Reasoning("empty completion".into()))?;

        Ok(content.trim().to_string())
    }
}

/// Wire shape of a chat completions response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
