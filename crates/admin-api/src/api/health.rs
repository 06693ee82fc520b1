//! Liveness with a database round trip

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

use super::ApiState;

pub async fn health_check(State(state): State<ApiState>) -> (StatusCode, Json<Value>) {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "callcenter-admin",
                "database": "connected",
                "timestamp": Utc::now(),
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "service": "callcenter-admin",
                    "database": "unavailable",
                    "timestamp": Utc::now(),
                })),
            )
        }
    }
}
