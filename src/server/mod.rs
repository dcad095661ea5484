//! Axum HTTP server — the endpoint the chat clients talk to.
//!
//! ## URL layout
//!
//! ```text
//! GET  /              → chat page (browser client)
//! POST /generate      → {"message", "model"} → {"summary", "response", "duration"}
//! GET  /api/models    → loaded model keys + default
//! GET  /api/health    → liveness + loaded model count
//! GET  /favicon.ico   → 204
//! ```

mod api;
mod ui;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::llm::ModelCatalog;

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone — the catalog is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub app_name: Arc<str>,
    pub catalog: Arc<ModelCatalog>,
}

impl AppState {
    pub fn new(app_name: &str, catalog: ModelCatalog) -> Self {
        Self { app_name: Arc::from(app_name), catalog: Arc::new(catalog) }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate",    post(api::generate))
        .route("/api/models",  get(api::models))
        .route("/api/health",  get(api::health))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/",            get(ui::index))
        .with_state(state)
}

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn run(bind_addr: &str, state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;
    serve(listener, state, shutdown).await
}

/// Serve on an already-bound listener until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let local_addr = listener
        .local_addr()
        .map_err(|e| AppError::Server(format!("listener has no local address: {e}")))?;
    info!(%local_addr, models = ?state.catalog.available(), "chat server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!("chat server shut down");
    Ok(())
}
