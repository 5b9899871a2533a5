// Handlers module
// HTTP handlers for the REST API

pub mod questions;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::{models::MessageResponse, store::SharedStore};

/// Liveness message
/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Quiz API is running"))
}

/// Storage readiness
/// GET /health
pub async fn health_check(State(store): State<SharedStore>) -> impl IntoResponse {
    match store.health_check().await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": {
                        "code": "UNAVAILABLE",
                        "message": "Storage is not available"
                    }
                })),
            )
                .into_response()
        }
    }
}
