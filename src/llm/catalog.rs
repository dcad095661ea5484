//! Registered models and which of them actually loaded.
//!
//! At startup every registered model is probed once; only the ones that
//! answer are offered to clients. Generation resolves a friendly key to its
//! backend name, calls the provider and turns the output into a [`Reply`].

use tracing::{info, warn};

use super::prompt::{SYSTEM_PROMPT, user_turn};
use super::{LlmProvider, ProviderError};
use crate::config::{LlmConfig, ModelEntry};
use crate::reply::{Reply, clean_reply, extract_reply, try_parse_json};

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    provider: LlmProvider,
    registered: Vec<ModelEntry>,
    loaded: Vec<ModelEntry>,
    default_model: String,
}

impl ModelCatalog {
    /// Catalog with nothing loaded yet.
    pub fn new(provider: LlmProvider, config: &LlmConfig) -> Self {
        Self {
            provider,
            registered: config.models.clone(),
            loaded: Vec::new(),
            default_model: config.default_model.clone(),
        }
    }

    /// Probe every registered model and keep the ones that answer.
    pub async fn initialize(&mut self) {
        info!(count = self.registered.len(), "initializing models");
        self.loaded.clear();
        for entry in &self.registered {
            match self.provider.probe(&entry.name).await {
                Ok(()) => {
                    info!(key = %entry.key, model = %entry.name, "model loaded");
                    self.loaded.push(entry.clone());
                }
                Err(e) => {
                    warn!(key = %entry.key, model = %entry.name, error = %e,
                        "model failed to load; pull it first with `summchat --pull`");
                }
            }
        }
        info!(loaded = ?self.available(), "model initialization complete");
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn registered(&self) -> &[ModelEntry] {
        &self.registered
    }

    /// Keys of loaded models, in registry order.
    pub fn available(&self) -> Vec<String> {
        self.loaded.iter().map(|m| m.key.clone()).collect()
    }

    pub fn is_available(&self, key: &str) -> bool {
        self.loaded.iter().any(|m| m.key == key)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Generate a reply to `user_prompt` with the model registered as `key`.
    ///
    /// An unloaded key is an error. A failing provider is not: the failure is
    /// reported to the user as the reply itself.
    pub async fn generate(&self, key: &str, user_prompt: &str) -> Result<Reply, ProviderError> {
        let entry = self
            .loaded
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| ProviderError::UnknownModel(format!("{key} (available: {:?})", self.available())))?;

        let raw = match self.provider.chat(&entry.name, SYSTEM_PROMPT, &user_turn(user_prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(model = %entry.name, error = %e, "generation failed");
                return Ok(Reply::new(
                    "Error occurred",
                    format!("Sorry, an error occurred while generating the response: {e}"),
                ));
            }
        };

        let parsed = if self.provider.json_mode() {
            try_parse_json(&raw)
        } else {
            extract_reply(&raw, user_prompt).to_value()
        };
        Ok(clean_reply(&parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::providers::dummy::DummyProvider;

    fn catalog(dummy: DummyProvider) -> ModelCatalog {
        let cfg = Config::test_default(std::path::Path::new("/tmp"));
        ModelCatalog::new(LlmProvider::Dummy(dummy), &cfg.llm)
    }

    #[tokio::test]
    async fn only_probed_models_are_available() {
        let mut c = catalog(DummyProvider::with_unavailable(["gemma2:2b"]));
        assert!(c.available().is_empty());
        c.initialize().await;
        assert_eq!(c.available(), ["llama3.2-3b"]);
        assert!(!c.is_available("gemma2-2b"));
    }

    #[tokio::test]
    async fn generate_returns_clean_reply() {
        let mut c = catalog(DummyProvider::default());
        c.initialize().await;
        let r = c.generate("gemma2-2b", "What is Rust?").await.unwrap();
        assert_eq!(r, Reply::new("echo", "[echo] What is Rust?"));
    }

    #[tokio::test]
    async fn unknown_key_is_an_error() {
        let mut c = catalog(DummyProvider::default());
        c.initialize().await;
        assert!(matches!(c.generate("gpt-9", "hi").await, Err(ProviderError::UnknownModel(_))));
    }

    #[tokio::test]
    async fn provider_failure_becomes_error_reply() {
        let mut c = catalog(DummyProvider::default());
        c.initialize().await;
        // Loaded, then the backend goes away.
        c.provider = LlmProvider::Dummy(DummyProvider::with_unavailable(["llama3.2:3b"]));
        let r = c.generate("llama3.2-3b", "hi").await.unwrap();
        assert_eq!(r.summary, "Error occurred");
        assert!(r.response.starts_with("Sorry, an error occurred while generating the response:"));
    }

    async fn generate_with(dummy: DummyProvider, prompt: &str) -> Reply {
        let mut c = catalog(dummy);
        c.initialize().await;
        c.generate("llama3.2-3b", prompt).await.unwrap()
    }

    #[tokio::test]
    async fn json_mode_uses_lenient_parse() {
        let raw = "The model said hi";
        let r = generate_with(DummyProvider::default().with_json_mode(true).with_canned_output(raw), "hi").await;
        assert_eq!(r, Reply::new("Could not parse summary.", raw));

        let r = generate_with(DummyProvider::default().with_canned_output(raw), "hi").await;
        assert_eq!(r, Reply::new("User asked: hi", raw));
    }

    #[tokio::test]
    async fn json_mode_keeps_nested_json_as_json() {
        let raw = r#"{"summary": "s", "response": "{\"b\": 1, \"a\": 2}"}"#;
        let r = generate_with(DummyProvider::default().with_json_mode(true).with_canned_output(raw), "q").await;
        assert_eq!(r, Reply::new("s", r#"{"b": 1, "a": 2}"#));

        let r = generate_with(DummyProvider::default().with_canned_output(raw), "q").await;
        assert_eq!(r, Reply::new("s", "**b:** 1\n\n**a:** 2"));
    }
}
