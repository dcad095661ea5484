//! HTTP contract tests for the chat server, driven through the router with
//! the dummy provider.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use summchat::config::Config;
use summchat::llm::providers::dummy::DummyProvider;
use summchat::llm::{LlmProvider, ModelCatalog};
use summchat::server::{AppState, build_router};

/// Router whose catalog loaded every registered model except `unavailable`.
async fn router_with(unavailable: &[&str]) -> Router {
    let cfg = Config::test_default(std::path::Path::new("/tmp"));
    let provider = LlmProvider::Dummy(DummyProvider::with_unavailable(unavailable.iter().copied()));
    let mut catalog = ModelCatalog::new(provider, &cfg.llm);
    catalog.initialize().await;
    build_router(AppState::new("summchat-test", catalog))
}

async fn router() -> Router {
    router_with(&[]).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn post_generate(body: Value) -> Request<Body> {
    Request::post("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn generate_returns_summary_and_response() {
    let (status, body) = send(router().await, post_generate(json!({"message": "hi", "model": "llama3.2-3b"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "echo");
    assert_eq!(body["response"], "[echo] hi");
    assert!(body["duration"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn generate_trims_the_message() {
    let (status, body) =
        send(router().await, post_generate(json!({"message": "  spaced  ", "model": "gemma2-2b"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "[echo] spaced");
}

#[tokio::test]
async fn missing_message_is_rejected() {
    let (status, body) = send(router().await, post_generate(json!({"model": "llama3.2-3b"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err = body["error"].as_str().unwrap();
    assert!(err.starts_with("Missing or invalid message or model selection."));
    assert!(err.contains("message='None'"));
    assert!(err.contains("model='llama3.2-3b'"));
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let (status, body) = send(router().await, post_generate(json!({"message": "   ", "model": "llama3.2-3b"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("message='   '"));
}

#[tokio::test]
async fn missing_model_is_shown_as_none() {
    let (status, body) = send(router().await, post_generate(json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("model='None'"));
}

#[tokio::test]
async fn unknown_model_is_rejected_with_available_list() {
    let (status, body) = send(router().await, post_generate(json!({"message": "hi", "model": "gpt-9"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err = body["error"].as_str().unwrap();
    assert!(err.contains("model='gpt-9'"));
    assert_eq!(
        err,
        "Missing or invalid message or model selection. Received: message='hi', model='gpt-9'. \
         Available models: ['gemma2-2b', 'llama3.2-3b']"
    );
}

#[tokio::test]
async fn model_that_failed_to_load_is_rejected() {
    let app = router_with(&["gemma2:2b"]).await;
    let (status, _) = send(app, post_generate(json!({"message": "hi", "model": "gemma2-2b"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_a_json_400() {
    let req = Request::post("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(router().await, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn models_lists_loaded_keys_and_default() {
    let app = router_with(&["gemma2:2b"]).await;
    let (status, body) = send(app, Request::get("/api/models").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"models": ["llama3.2-3b"], "default": "llama3.2-3b"}));
}

#[tokio::test]
async fn health_reports_loaded_model_count() {
    let (status, body) = send(router().await, Request::get("/api/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "summchat-test");
    assert_eq!(body["models"], 2);
}

#[tokio::test]
async fn index_serves_the_chat_page() {
    let resp = router()
        .await
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("aiChatHistory"));
    assert!(page.contains(r#"<option value="llama3.2-3b" selected>"#));
}

#[tokio::test]
async fn favicon_is_empty() {
    let (status, body) = send(router().await, Request::get("/favicon.ico").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}
