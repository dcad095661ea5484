//! Chat session controller.
//!
//! Owns the history, the transport and the output sink. Every user turn is
//! recorded and persisted before the request goes out; a reply is recorded
//! and persisted when it arrives. Errors are shown but never stored.

use std::io::Write;

use tracing::{info, warn};

use super::history::HistoryStore;
use super::message::ChatMessage;
use super::render::{render_message, render_notice};
use super::transport::{GenerateClient, GenerateOutcome};
use crate::error::AppError;

pub const CLEARED_NOTICE: &str = "✅ Chat history has been cleared successfully.";

/// Result of one [`ChatSession::send`] turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// The reply was shown and stored.
    Replied(ChatMessage),
    /// An error was shown; nothing was stored for the reply.
    Failed(String),
}

pub struct ChatSession<W: Write> {
    history: HistoryStore,
    client: GenerateClient,
    model: String,
    out: W,
}

impl<W: Write> ChatSession<W> {
    pub fn new(history: HistoryStore, client: GenerateClient, model: impl Into<String>, out: W) -> Self {
        Self { history, client, model: model.into(), out }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn client(&self) -> &GenerateClient {
        &self.client
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.out
    }

    /// Render every stored message in order.
    pub fn load(&mut self) -> Result<(), AppError> {
        for msg in self.history.entries() {
            self.out.write_all(render_message(msg).as_bytes())?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Send one user turn. Blank input is ignored and returns `None`.
    pub async fn send(&mut self, input: &str) -> Result<Option<Turn>, AppError> {
        let message = input.trim();
        if message.is_empty() {
            return Ok(None);
        }

        let user = ChatMessage::user(message, Some(self.model.clone()));
        self.show(&user)?;
        self.history.append(user)?;

        let outcome = self.client.generate(message, &self.model).await;
        let turn = match outcome {
            Ok(GenerateOutcome::Reply { reply, duration }) => {
                info!(model = %self.model, duration, "reply received");
                let ai = ChatMessage::from_reply(&reply, Some(self.model.clone()));
                self.show(&ai)?;
                self.history.append(ai.clone())?;
                Turn::Replied(ai)
            }
            Ok(GenerateOutcome::Error(e)) => self.fail(e)?,
            Err(e) => {
                warn!(error = %e, "generate request failed");
                let text = match e {
                    AppError::Transport(msg) => msg,
                    other => other.to_string(),
                };
                self.fail(text)?
            }
        };
        Ok(Some(turn))
    }

    /// Empty the history (memory and file) and confirm on the output.
    pub fn clear(&mut self) -> Result<(), AppError> {
        self.history.clear()?;
        info!("chat history cleared");
        self.out.write_all(render_notice(CLEARED_NOTICE).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn fail(&mut self, error: String) -> Result<Turn, AppError> {
        let shown = ChatMessage::ai(format!("Error: {error}"), None);
        self.show(&shown)?;
        Ok(Turn::Failed(error))
    }

    fn show(&mut self, msg: &ChatMessage) -> Result<(), AppError> {
        self.out.write_all(render_message(msg).as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> ChatSession<Vec<u8>> {
        let history = HistoryStore::open(dir.path().join("history.json"));
        let client = GenerateClient::new("http://127.0.0.1:9", 2).unwrap();
        ChatSession::new(history, client, "gemma2-2b", Vec::new())
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        assert_eq!(s.send("   \n").await.unwrap(), None);
        assert!(s.history().is_empty());
        assert!(s.output().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_keeps_user_turn_only() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let turn = s.send("  hello  ").await.unwrap();
        assert!(matches!(turn, Some(Turn::Failed(_))));

        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history().entries()[0].content, "hello");
        assert_eq!(s.history().entries()[0].model.as_deref(), Some("gemma2-2b"));

        let shown = String::from_utf8(s.output().clone()).unwrap();
        assert!(shown.contains("👤"));
        assert!(shown.contains("Error: "));
    }

    #[tokio::test]
    async fn history_write_failure_is_reported_and_nothing_is_kept() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let history = HistoryStore::open(blocker.join("history.json"));
        let client = GenerateClient::new("http://127.0.0.1:9", 2).unwrap();
        let mut s = ChatSession::new(history, client, "gemma2-2b", Vec::new());

        assert!(matches!(s.send("hello").await, Err(AppError::History(_))));
        assert!(s.history().is_empty());
    }

    #[test]
    fn clear_confirms_and_empties() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.history.append(ChatMessage::user("x", None)).unwrap();
        s.clear().unwrap();
        assert!(s.history().is_empty());
        let shown = String::from_utf8(s.output().clone()).unwrap();
        assert!(shown.contains(CLEARED_NOTICE));
    }

    #[test]
    fn load_renders_history_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        {
            let mut h = HistoryStore::open(&path);
            h.append(ChatMessage::user("first question", None)).unwrap();
            h.append(ChatMessage::ai("Summary: s\nResponse: first answer", None)).unwrap();
        }
        let mut s = session(&dir);
        s.load().unwrap();
        let shown = String::from_utf8(s.output().clone()).unwrap();
        let q = shown.find("first question").unwrap();
        let a = shown.find("first answer").unwrap();
        assert!(q < a);
    }
}
