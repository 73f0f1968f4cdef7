use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProviderSettings;
use crate::error::FaqError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion backend. `response_format` is passed through verbatim
/// (e.g. a `json_schema` structured-output request).
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        response_format: Option<&Value>,
    ) -> Result<String, FaqError>;
}

/// Resolve an API endpoint from a base URL that may or may not already
/// carry `/v1` or the full path.
pub(crate) fn resolve_endpoint(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with(path) {
        base.to_string()
    } else if base.ends_with("/v1") {
        format!("{}/{}", base, path)
    } else {
        format!("{}/v1/{}", base, path)
    }
}

/// Build the shared HTTP client used by both providers.
pub fn http_client(settings: &ProviderSettings) -> Result<reqwest::Client, FaqError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| FaqError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.clone(),
            model: settings.llm_model.clone(),
            temperature: settings.temperature,
            api_key: Some(settings.api_key.clone()).filter(|k| !k.is_empty()),
        }
    }

    fn endpoint(&self) -> String {
        resolve_endpoint(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    /// Non-streaming chat completion.
    async fn complete(
        &self,
        messages: &[Message],
        response_format: Option<&Value>,
    ) -> Result<String, FaqError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": 2048,
        });
        if let Some(format) = response_format {
            body["response_format"] = format.clone();
        }

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| FaqError::Synthesis(format!("LLM request failed: {}", e)))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| FaqError::Synthesis(format!("Failed to read LLM response: {}", e)))?;
        if !status.is_success() {
            return Err(FaqError::Synthesis(format!(
                "LLM returned {}: {}",
                status,
                truncate(&text, 300)
            )));
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| FaqError::Synthesis(format!("Failed to parse LLM JSON: {}", e)))?;

        // choices[0].message.content; a refusal or null content is a failure
        json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .map(str::to_string)
            .ok_or_else(|| FaqError::Synthesis("LLM response carried no message content".to_string()))
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
