//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `SUMMCHAT_WORK_DIR`, `SUMMCHAT_LOG_LEVEL`,
//! `SUMMCHAT_SERVER_URL` and `OLLAMA_HOST` env overrides.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs (`Config`, `LlmConfig`, …).
//! - **raw** — Raw TOML deserialization types (`RawConfig`, `RawLlm`, …).
//!   These mirror the file shape and use serde defaults; kept private.
//! - **load** — Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{EnvOverrides, builtin, expand_home, load, load_from};
pub use types::*;

impl Config {
    /// Safe `Config` for tests — dummy LLM, everything under `work_dir`.
    pub fn test_default(work_dir: &std::path::Path) -> Self {
        Self {
            app_name: "test".into(),
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            server: ServerConfig { bind: "127.0.0.1:0".into() },
            client: ClientConfig {
                server_url: "http://127.0.0.1:0".into(),
                timeout_seconds: 1,
                history_file: work_dir.join("chat_history.json"),
                default_model: None,
            },
            llm: LlmConfig {
                provider: "dummy".into(),
                default_model: "llama3.2-3b".into(),
                max_new_tokens: 2048,
                ollama: OllamaConfig {
                    base_url: "http://127.0.0.1:0".into(),
                    timeout_seconds: 1,
                    temperature: 0.7,
                    top_p: 0.9,
                    repeat_penalty: 1.2,
                    json_mode: false,
                },
                models: vec![
                    ModelEntry { key: "gemma2-2b".into(), name: "gemma2:2b".into() },
                    ModelEntry { key: "llama3.2-3b".into(), name: "llama3.2:3b".into() },
                ],
            },
        }
    }
}
