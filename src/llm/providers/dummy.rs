//! Dummy LLM provider — answers every question with a well-formed reply
//! echoing the question. Used to exercise the full request path without a
//! running model server.

use crate::llm::ProviderError;

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    /// Backend model names that fail to probe or chat.
    unavailable: Vec<String>,
    json_mode: bool,
    /// Fixed raw output returned instead of the echo.
    canned: Option<String>,
}

impl DummyProvider {
    pub fn with_unavailable(models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { unavailable: models.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    /// Report strict JSON output mode, like `[llm.ollama] json_mode`.
    pub fn with_json_mode(mut self, on: bool) -> Self {
        self.json_mode = on;
        self
    }

    /// Answer every chat with `raw` verbatim.
    pub fn with_canned_output(mut self, raw: impl Into<String>) -> Self {
        self.canned = Some(raw.into());
        self
    }

    pub fn json_mode(&self) -> bool {
        self.json_mode
    }

    fn check(&self, model: &str) -> Result<(), ProviderError> {
        if self.unavailable.iter().any(|m| m == model) {
            Err(ProviderError::Request(format!("model '{model}' not found")))
        } else {
            Ok(())
        }
    }

    /// Echo the first line of the user turn (the question itself) as the response.
    pub async fn chat(&self, model: &str, _system: &str, user: &str) -> Result<String, ProviderError> {
        self.check(model)?;
        if let Some(raw) = &self.canned {
            return Ok(raw.clone());
        }
        let question = user.lines().next().unwrap_or_default();
        Ok(serde_json::json!({
            "summary": "echo",
            "response": format!("[echo] {question}"),
        })
        .to_string())
    }

    pub async fn probe(&self, model: &str) -> Result<(), ProviderError> {
        self.check(model)
    }

    pub async fn pull(&self, _model: &str) -> Result<(), ProviderError> {
        Ok(())
    }

    pub fn local_models(&self) -> Vec<String> {
        Vec::new()
    }
}
