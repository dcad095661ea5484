//! Handlers for `/generate` and `/api/*`.

use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct GenerateRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

/// Shown in validation errors for an absent field.
const NOT_GIVEN: &str = "None";

/// `['a', 'b']`
fn quoted_list(items: &[String]) -> String {
    let inner: Vec<String> = items.iter().map(|i| format!("'{i}'")).collect();
    format!("[{}]", inner.join(", "))
}

fn json_error(status: StatusCode, msg: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "error": msg.to_string() }))).into_response()
}

/// POST /generate
pub(super) async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection, "rejected generate body");
            return json_error(StatusCode::BAD_REQUEST, format!("Invalid request body: {rejection}"));
        }
    };
    debug!(?req, "generate request");

    let available = state.catalog.available();
    let message = req.message.as_deref().map(str::trim).unwrap_or_default();
    let model = req.model.as_deref().unwrap_or_default();

    if message.is_empty() || model.is_empty() || !state.catalog.is_available(model) {
        let msg = format!(
            "Missing or invalid message or model selection. Received: message='{}', model='{}'. Available models: {}",
            req.message.as_deref().unwrap_or(NOT_GIVEN),
            req.model.as_deref().unwrap_or(NOT_GIVEN),
            quoted_list(&available),
        );
        warn!(%msg, "generate validation failed");
        return json_error(StatusCode::BAD_REQUEST, msg);
    }

    let started = Instant::now();
    match state.catalog.generate(model, message).await {
        Ok(reply) => {
            let duration = started.elapsed().as_secs_f64();
            info!(%model, duration, summary = %reply.summary, "reply generated");
            (
                StatusCode::OK,
                Json(json!({
                    "summary": reply.summary,
                    "response": reply.response,
                    "duration": duration,
                })),
            )
                .into_response()
        }
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {e}")),
    }
}

/// GET /api/models
pub(super) async fn models(State(state): State<AppState>) -> Response {
    Json(json!({
        "models": state.catalog.available(),
        "default": state.catalog.default_model(),
    }))
    .into_response()
}

/// GET /api/health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "name": &*state.app_name,
        "models": state.catalog.available().len(),
    }))
    .into_response()
}
