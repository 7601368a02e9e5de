use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;

pub const LIVENESS_BODY: &str = "Bot is running";

/// GET / - fixed plaintext for external uptime checks
pub async fn root() -> &'static str {
    LIVENESS_BODY
}

/// GET /health - liveness plus a store ping; 503 when the store is unreachable
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.health_check().await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }
    })))
}
