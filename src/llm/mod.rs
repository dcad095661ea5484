//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! The async methods live on the enum so callers need no trait-object
//! machinery.

pub mod catalog;
pub mod prompt;
pub mod providers;

use thiserror::Error;

pub use catalog::ModelCatalog;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("model {0} not loaded")]
    UnknownModel(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Adding a backend = new module + new variant + new match arms.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Ollama(providers::ollama::OllamaProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// One chat round-trip against backend model `model`; returns the raw text.
    pub async fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.chat(model, system, user).await,
            LlmProvider::Dummy(p) => p.chat(model, system, user).await,
        }
    }

    /// Minimal generation to confirm `model` is installed and loads.
    pub async fn probe(&self, model: &str) -> Result<(), ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.probe(model).await,
            LlmProvider::Dummy(p) => p.probe(model).await,
        }
    }

    /// Download `model` to the backend.
    pub async fn pull(&self, model: &str) -> Result<(), ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.pull(model).await,
            LlmProvider::Dummy(p) => p.pull(model).await,
        }
    }

    /// Backend model names already present locally.
    pub async fn local_models(&self) -> Result<Vec<String>, ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.local_models().await,
            LlmProvider::Dummy(p) => Ok(p.local_models()),
        }
    }

    /// Whether output was requested in strict JSON mode.
    pub fn json_mode(&self) -> bool {
        match self {
            LlmProvider::Ollama(p) => p.json_mode(),
            LlmProvider::Dummy(p) => p.json_mode(),
        }
    }
}
