//! Terminal client against a live server on an ephemeral port.

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use summchat::chat::session::Turn;
use summchat::chat::{ChatSession, GenerateClient, HistoryStore, Sender};
use summchat::config::Config;
use summchat::llm::{ModelCatalog, providers};
use summchat::server::{self, AppState};

async fn spawn_server() -> (String, CancellationToken) {
    let cfg = Config::test_default(std::path::Path::new("/tmp"));
    let mut catalog = ModelCatalog::new(providers::build(&cfg.llm).unwrap(), &cfg.llm);
    catalog.initialize().await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(server::serve(listener, AppState::new("roundtrip", catalog), shutdown.clone()));
    (format!("http://{addr}"), shutdown)
}

fn session(url: &str, dir: &TempDir, model: &str) -> ChatSession<Vec<u8>> {
    let history = HistoryStore::open(dir.path().join("chat_history.json"));
    let client = GenerateClient::new(url, 5).unwrap();
    ChatSession::new(history, client, model, Vec::new())
}

#[tokio::test]
async fn reply_is_shown_and_persisted() {
    let (url, shutdown) = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let mut chat = session(&url, &dir, "llama3.2-3b");

    let turn = chat.send("hi").await.unwrap();
    assert!(matches!(turn, Some(Turn::Replied(_))));

    let shown = String::from_utf8(chat.output().clone()).unwrap();
    assert!(shown.contains("📝 Summary: echo"));
    assert!(shown.contains("[echo] hi"));

    let entries = chat.history().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sender, Sender::User);
    assert_eq!(entries[0].content, "hi");
    assert_eq!(entries[1].sender, Sender::Ai);
    assert_eq!(entries[1].content, "Summary: echo\nResponse: [echo] hi");
    assert_eq!(entries[1].model.as_deref(), Some("llama3.2-3b"));

    // A fresh store sees the same file.
    let reopened = HistoryStore::open(dir.path().join("chat_history.json"));
    assert_eq!(reopened.entries(), entries);

    shutdown.cancel();
}

#[tokio::test]
async fn server_rejection_is_shown_but_not_persisted() {
    let (url, shutdown) = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let mut chat = session(&url, &dir, "no-such-model");

    let turn = chat.send("hi").await.unwrap();
    let error = match turn {
        Some(Turn::Failed(error)) => error,
        other => panic!("expected failure, got {other:?}"),
    };
    assert!(error.contains("Missing or invalid message or model selection"));

    assert_eq!(chat.history().len(), 1);
    let shown = String::from_utf8(chat.output().clone()).unwrap();
    assert!(shown.contains("Error: Missing or invalid"));

    shutdown.cancel();
}

#[tokio::test]
async fn client_lists_server_models() {
    let (url, shutdown) = spawn_server().await;
    let client = GenerateClient::new(&url, 5).unwrap();

    let list = client.models().await.unwrap();
    assert_eq!(list.models, vec!["gemma2-2b", "llama3.2-3b"]);
    assert_eq!(list.default, "llama3.2-3b");

    shutdown.cancel();
}
