//! HTTP client for the server's chat endpoints.
//!
//! ```text
//! POST /generate     {"message", "model"} → {"summary", "response", "duration"} | {"error"}
//! GET  /api/models   → {"models": [...], "default": "..."}
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::AppError;
use crate::reply::Reply;

/// What the server answered to a generate request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    Reply { reply: Reply, duration: f64 },
    /// The server's `error` message.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelList {
    pub models: Vec<String>,
    pub default: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    message: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    summary: String,
    response: String,
    #[serde(default)]
    duration: f64,
}

/// Cheap to clone — `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct GenerateClient {
    client: Client,
    base_url: String,
}

impl GenerateClient {
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| AppError::Transport(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `message` for `model`.
    ///
    /// The body is read as JSON whatever the status: the server reports
    /// validation and model failures in an `error` field.
    pub async fn generate(&self, message: &str, model: &str) -> Result<GenerateOutcome, AppError> {
        let url = format!("{}/generate", self.base_url);
        debug!(%url, %model, message_len = message.len(), "sending generate request");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { message, model })
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, "generate request failed (transport)");
                AppError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("HTTP {status}: unreadable response body: {e}")))?;

        if let Some(err) = body.get("error") {
            let message = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
            debug!(%status, %message, "server returned error");
            return Ok(GenerateOutcome::Error(message));
        }

        let parsed: GenerateResponse = serde_json::from_value(body)
            .map_err(|e| AppError::Transport(format!("HTTP {status}: unexpected response shape: {e}")))?;

        debug!(duration = parsed.duration, "generate reply received");
        Ok(GenerateOutcome::Reply {
            reply: Reply::new(parsed.summary, parsed.response),
            duration: parsed.duration,
        })
    }

    /// Models the server has loaded.
    pub async fn models(&self) -> Result<ModelList, AppError> {
        let url = format!("{}/api/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("HTTP {status} from {url}")));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("unreadable model list: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let c = GenerateClient::new("http://localhost:5000/", 5).unwrap();
        assert_eq!(c.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let c = GenerateClient::new("http://127.0.0.1:9", 2).unwrap();
        match c.generate("hi", "gemma2-2b").await {
            Err(AppError::Transport(_)) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
