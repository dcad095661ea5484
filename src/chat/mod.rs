//! Chat client — the user-facing half of summchat.
//!
//! - **message** — the persisted `ChatMessage` record.
//! - **history** — append-only history file (the client's local storage).
//! - **render** — terminal rendering of messages.
//! - **transport** — HTTP client for the server's `/generate` contract.
//! - **session** — the controller tying the above together.

pub mod history;
pub mod message;
pub mod render;
pub mod session;
pub mod transport;

pub use history::HistoryStore;
pub use message::{ChatMessage, Sender};
pub use session::ChatSession;
pub use transport::{GenerateClient, GenerateOutcome, ModelList};
