//! Ollama provider (`/api/chat`, `/api/pull`, `/api/tags`).
//!
//! All Ollama wire types are private to this module. Requests are
//! non-streaming: one request, one complete JSON answer.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::ProviderError;

/// Sampling and connection settings, resolved from `[llm]` / `[llm.ollama]`.
#[derive(Debug, Clone)]
pub struct OllamaSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub num_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    pub json_mode: bool,
}

/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    settings: OllamaSettings,
}

impl OllamaProvider {
    pub fn new(settings: OllamaSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    pub fn json_mode(&self) -> bool {
        self.settings.json_mode
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.base_url)
    }

    /// Send `system` + `user` to `model` and return the assistant text.
    pub async fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, ProviderError> {
        let s = &self.settings;
        let payload = ChatRequest {
            model,
            messages: vec![
                Message { role: "system", content: system },
                Message { role: "user", content: user },
            ],
            stream: false,
            format: s.json_mode.then_some("json"),
            options: Options {
                num_predict: s.num_predict,
                temperature: s.temperature,
                top_p: Some(s.top_p),
                repeat_penalty: Some(s.repeat_penalty),
            },
        };

        debug!(%model, user_len = user.len(), json_mode = s.json_mode, "sending Ollama chat request");
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full Ollama request payload");
        }

        let reply = self.send_chat(&payload).await?;
        trace!(content = %reply, "raw model output");
        Ok(reply)
    }

    /// One-token generation with a fixed greeting.
    pub async fn probe(&self, model: &str) -> Result<(), ProviderError> {
        let payload = ChatRequest {
            model,
            messages: vec![Message { role: "user", content: "Hello" }],
            stream: false,
            format: None,
            options: Options { num_predict: 1, temperature: 0.1, top_p: None, repeat_penalty: None },
        };
        self.send_chat(&payload).await.map(|_| ())
    }

    pub async fn pull(&self, model: &str) -> Result<(), ProviderError> {
        let url = self.url("/api/pull");
        debug!(%model, "pulling model");
        // Downloads outlast the generation timeout; use a per-request override.
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(60 * 60))
            .json(&PullRequest { model, stream: false })
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let response = check_status(response).await?;
        let status: PullResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Request(format!("failed to parse pull response: {e}")))?;
        if status.status == "success" {
            Ok(())
        } else {
            Err(ProviderError::Request(format!("pull of '{model}' ended with status '{}'", status.status)))
        }
    }

    pub async fn local_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = self.url("/api/tags");
        let response = self.client.get(&url).send().await.map_err(|e| transport_error(&url, e))?;
        let response = check_status(response).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Request(format!("failed to parse tags response: {e}")))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn send_chat(&self, payload: &ChatRequest<'_>) -> Result<String, ProviderError> {
        let url = self.url("/api/chat");
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize Ollama response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| ProviderError::Request("missing message in response".into()))
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> ProviderError {
    error!(%url, error = %e, timeout = e.is_timeout(), "Ollama HTTP request failed (transport)");
    ProviderError::Request(e.to_string())
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Options {
    num_predict: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat_penalty: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: Options,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

// Ollama reports failures as `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => format!("HTTP {status}: {}", env.error),
        Err(_) => format!("HTTP {status}: {body}"),
    };

    error!(%status, %message, "Ollama request returned HTTP error");
    Err(ProviderError::Request(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OllamaSettings {
        OllamaSettings {
            base_url: "http://127.0.0.1:11434".into(),
            timeout_seconds: 5,
            num_predict: 2048,
            temperature: 0.7,
            top_p: 0.9,
            repeat_penalty: 1.2,
            json_mode: false,
        }
    }

    #[test]
    fn constructs_provider() {
        assert!(OllamaProvider::new(settings()).is_ok());
    }

    #[test]
    fn chat_request_shape() {
        let req = ChatRequest {
            model: "llama3.2:3b",
            messages: vec![Message { role: "user", content: "hi" }],
            stream: false,
            format: Some("json"),
            options: Options { num_predict: 1, temperature: 0.1, top_p: None, repeat_penalty: None },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["stream"], false);
        assert_eq!(v["format"], "json");
        assert_eq!(v["options"]["num_predict"], 1);
        assert!(v["options"].get("top_p").is_none());
        assert_eq!(v["messages"][0]["role"], "user");
    }

    #[test]
    fn format_is_omitted_outside_json_mode() {
        let req = ChatRequest {
            model: "m",
            messages: vec![],
            stream: false,
            format: None,
            options: Options { num_predict: 1, temperature: 0.1, top_p: None, repeat_penalty: None },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("format").is_none());
    }

    #[test]
    fn chat_response_parses() {
        let body = r#"{"model":"m","message":{"role":"assistant","content":"{\"summary\":\"s\"}"},"done":true}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.unwrap().content, r#"{"summary":"s"}"#);
    }

    #[tokio::test]
    async fn unreachable_daemon_is_request_error() {
        let mut s = settings();
        s.base_url = "http://127.0.0.1:9".into();
        let p = OllamaProvider::new(s).unwrap();
        assert!(matches!(p.probe("m").await, Err(ProviderError::Request(_))));
    }
}
