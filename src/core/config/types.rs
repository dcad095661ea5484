//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the server, the chat client
//! and the LLM layer consume. Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

// ── Server ──────────────────────────────────────────────────────────────────

/// HTTP server configuration (`[server]`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the axum listener binds to.
    pub bind: String,
}

// ── Client ──────────────────────────────────────────────────────────────────

/// Terminal chat client configuration (`[client]`).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the summchat server, without a trailing slash.
    pub server_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// History file (already resolved against `work_dir`).
    pub history_file: PathBuf,
    /// Model key preselected in the client. Falls back to `llm.default_model`.
    pub default_model: Option<String>,
}

// ── LLM ─────────────────────────────────────────────────────────────────────

/// Ollama backend configuration (`[llm.ollama]`).
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Daemon base URL, e.g. `http://127.0.0.1:11434`.
    pub base_url: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    /// Ask Ollama for JSON output (`format: "json"`).
    pub json_mode: bool,
}

/// One registry entry: friendly key exposed to users → backend model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub key: String,
    pub name: String,
}

/// LLM subsystem configuration (`[llm]`).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Active provider (`"ollama"` or `"dummy"`).
    pub provider: String,
    /// Model key selected when the caller does not name one.
    pub default_model: String,
    /// Upper bound on generated tokens (`num_predict`).
    pub max_new_tokens: u32,
    pub ollama: OllamaConfig,
    /// Supported models, in declaration order.
    pub models: Vec<ModelEntry>,
}

// ── Top-level ───────────────────────────────────────────────────────────────

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    /// Working directory for persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub llm: LlmConfig,
}

impl Config {
    /// Model key the client should start with.
    pub fn client_model(&self) -> &str {
        self.client
            .default_model
            .as_deref()
            .unwrap_or(self.llm.default_model.as_str())
    }
}
