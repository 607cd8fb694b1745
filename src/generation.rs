//! Generation backend.
//!
//! [`GenerationClient`] is the seam between the pipeline and the remote
//! model. [`ChatCompletionsClient`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint (Groq by default) with one system and one
//! user message.
//!
//! There is no retry: a failed call is reported to the caller at once.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::ResolutionError;
use crate::prompt::Prompt;

#[async_trait]
pub trait GenerationClient: Send + Sync {
    fn model_name(&self) -> &str;

    /// Run one completion for `prompt`.
    ///
    /// Must fail with [`ResolutionError::MissingCredential`] before any
    /// network activity when `api_key` is absent.
    async fn generate(&self, prompt: &Prompt, api_key: Option<&str>)
        -> Result<String, ResolutionError>;
}

pub struct ChatCompletionsClient {
    endpoint: String,
    model: String,
    temperature: f32,
    timeout: Option<Duration>,
}

impl ChatCompletionsClient {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    fn connect(&self) -> Result<(reqwest::Client, reqwest::Url), ResolutionError> {
        if self.model.trim().is_empty() {
            return Err(ResolutionError::ModelInit("no model name configured".into()));
        }

        let url = reqwest::Url::parse(&format!("{}/chat/completions", self.endpoint))
            .map_err(|e| {
                ResolutionError::ModelInit(format!("invalid endpoint '{}': {}", self.endpoint, e))
            })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ResolutionError::ModelInit(e.to_string()))?;

        Ok((client, url))
    }

    fn request_body(&self, prompt: &Prompt) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "stream": false,
            "messages": [
                {"role": "system", "content": prompt.system_instruction},
                {"role": "user", "content": prompt.user_message},
            ],
        })
    }
}

#[async_trait]
impl GenerationClient for ChatCompletionsClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        api_key: Option<&str>,
    ) -> Result<String, ResolutionError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ResolutionError::MissingCredential)?;

        let (client, url) = self.connect()?;

        let response = client
            .post(url)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| ResolutionError::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ResolutionError::Generation(format!(
                "HTTP {} from {}: {}",
                status, self.model, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ResolutionError::Generation(format!("invalid response body: {}", e)))?;

        parse_completion(&json)
    }
}

/// Pull `choices[0].message.content` out of a chat completion response.
fn parse_completion(json: &serde_json::Value) -> Result<String, ResolutionError> {
    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            ResolutionError::Generation(
                "malformed response: missing choices[0].message.content".into(),
            )
        })?;

    if content.trim().is_empty() {
        return Err(ResolutionError::Generation("model returned an empty response".into()));
    }
    Ok(content.to_string())
}
