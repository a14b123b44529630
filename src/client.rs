use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("chat API response missing content")]
    MissingContent,
}

/// Single-shot text completion.
pub trait ModelClient {
    fn complete(&self, prompt: &str) -> Result<String, ClientError>;
}

pub struct OpenAiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(
        model: &str,
        api_key: Option<&str>,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ClientError::MissingApiKey)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(OpenAiClient {
            model: model.to_string(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        })
    }
}

impl ModelClient for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let payload: Value = resp.json()?;
        message_content(&payload)
    }
}

fn message_content(payload: &Value) -> Result<String, ClientError> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ClientError::MissingContent)
}
