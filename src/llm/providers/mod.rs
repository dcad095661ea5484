//! LLM provider implementations.
//!
//! `build(config)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod ollama;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config.
pub fn build(config: &LlmConfig) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider::default())),
        "ollama" => {
            let o = &config.ollama;
            let p = ollama::OllamaProvider::new(ollama::OllamaSettings {
                base_url: o.base_url.clone(),
                timeout_seconds: o.timeout_seconds,
                num_predict: config.max_new_tokens,
                temperature: o.temperature,
                top_p: o.top_p,
                repeat_penalty: o.repeat_penalty,
                json_mode: o.json_mode,
            })?;
            Ok(LlmProvider::Ollama(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
