use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

use super::AppState;
use crate::dispatch::{DispatchOutcome, OutcomeStatus};
use crate::error::ApiError;
use crate::telegram::RawUpdate;
use crate::types::Update;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// POST /webhook - one platform update per request.
///
/// The update runs in its own task; the task's outcome is awaited and echoed in the 200
/// body. Failed or panicking tasks still answer 200 so the platform does not redeliver.
pub async fn webhook_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    verify_secret(state.webhook_secret.as_deref(), &headers)?;

    let raw: RawUpdate = serde_json::from_slice(&body)
        .map_err(|e| ApiError::invalid_json(format!("Invalid update body: {}", e)))?;
    let update_id = raw.update_id;

    let Some(update) = Update::from_raw(raw, &state.bot_username) else {
        debug!("Ignoring update {}: no sender message or not addressed to us", update_id);
        return Ok(acknowledge(DispatchOutcome {
            route: "none",
            status: OutcomeStatus::Ignored,
            reply_sent: false,
        }));
    };

    let route = update.kind.route();
    let router = state.router.clone();
    let task = tokio::spawn(async move { router.dispatch(&update).await });

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Update {} task aborted: {}", update_id, e);
            aborted(route)
        }
    };
    Ok(acknowledge(outcome))
}

/// Outcome for a handler task that panicked or was cancelled before reporting
fn aborted(route: &'static str) -> DispatchOutcome {
    DispatchOutcome {
        route,
        status: OutcomeStatus::Failed {
            error: "update task aborted".to_string(),
        },
        reply_sent: false,
    }
}

fn acknowledge(outcome: DispatchOutcome) -> Json<Value> {
    Json(json!({ "ok": true, "outcome": outcome }))
}

/// When a secret is configured the platform must echo it in the secret header
fn verify_secret(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let provided = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        warn!("Rejected webhook call with missing or wrong secret token");
        Err(ApiError::unauthorized("Invalid webhook secret token"))
    }
}
