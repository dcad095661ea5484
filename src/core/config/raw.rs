//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape — serde target before resolution.
#[derive(Deserialize)]
pub(super) struct RawConfig {
    pub app: RawApp,
    #[serde(default)]
    pub server: RawServer,
    #[serde(default)]
    pub client: RawClient,
    #[serde(default)]
    pub llm: RawLlm,
}

#[derive(Deserialize)]
pub(super) struct RawApp {
    #[serde(default = "default_app_name")]
    pub name: String,
    pub work_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Server ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawClient {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_client_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_history_file")]
    pub history_file: String,
    #[serde(default)]
    pub default_model: Option<String>,
}

impl Default for RawClient {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_seconds: default_client_timeout(),
            history_file: default_history_file(),
            default_model: None,
        }
    }
}

// ── LLM ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_model_key")]
    pub default_model: String,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default)]
    pub ollama: RawOllama,
    #[serde(default = "default_models")]
    pub models: Vec<RawModel>,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            default_model: default_model_key(),
            max_new_tokens: default_max_new_tokens(),
            ollama: RawOllama::default(),
            models: default_models(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOllama {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,
    #[serde(default)]
    pub json_mode: bool,
}

impl Default for RawOllama {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            timeout_seconds: default_ollama_timeout(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            repeat_penalty: default_repeat_penalty(),
            json_mode: false,
        }
    }
}

#[derive(Deserialize, Clone)]
pub(super) struct RawModel {
    pub key: String,
    pub name: String,
}

// ── Defaults ────────────────────────────────────────────────────────────────

pub(super) fn default_app_name() -> String {
    "summchat".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

pub(super) fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

pub(super) fn default_client_timeout() -> u64 {
    300
}

pub(super) fn default_history_file() -> String {
    "chat_history.json".to_string()
}

pub(super) fn default_llm_provider() -> String {
    "ollama".to_string()
}

pub(super) fn default_model_key() -> String {
    "llama3.2-3b".to_string()
}

pub(super) fn default_max_new_tokens() -> u32 {
    2048
}

pub(super) fn default_ollama_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

pub(super) fn default_ollama_timeout() -> u64 {
    300
}

pub(super) fn default_temperature() -> f32 {
    0.7
}

pub(super) fn default_top_p() -> f32 {
    0.9
}

pub(super) fn default_repeat_penalty() -> f32 {
    1.2
}

pub(super) fn default_models() -> Vec<RawModel> {
    vec![
        RawModel { key: "gemma2-2b".to_string(), name: "gemma2:2b".to_string() },
        RawModel { key: "llama3.2-3b".to_string(), name: "llama3.2:3b".to_string() },
    ]
}
