use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use super::dto::{BatchOptions, BatchSummary, CredentialResponse, SendOptions};
use crate::{auth::extractors::StaffUser, error::AppError, state::AppState};

pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/credentials/students/:id/send", post(send_credentials))
        .route("/credentials/students/:id/notify", post(notify_eligibility_status))
        .route("/credentials/batch", post(batch_send))
}

/// Options body: empty means defaults, anything else must parse.
fn parse_options<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

#[instrument(skip(state, staff, body))]
pub async fn send_credentials(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<CredentialResponse>, AppError> {
    let options: SendOptions = parse_options(&body)?;
    info!(student_id = id, staff_id = staff.sub, "credential send requested");
    let outcome = state.credentials.send_credentials(id, options).await?;
    info!(student_id = id, email_sent = outcome.email_sent(), "credential send finished");
    Ok(Json(outcome.into()))
}

#[instrument(skip(state, staff))]
pub async fn notify_eligibility_status(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<CredentialResponse>, AppError> {
    info!(student_id = id, staff_id = staff.sub, "eligibility notification requested");
    let outcome = state.credentials.notify_eligibility_status(id).await?;
    info!(student_id = id, email_sent = outcome.email_sent(), "eligibility notification finished");
    Ok(Json(outcome.into()))
}

#[instrument(skip(state, staff, body))]
pub async fn batch_send(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    body: Bytes,
) -> Result<Json<BatchSummary>, AppError> {
    let options: BatchOptions = parse_options(&body)?;
    info!(staff_id = staff.sub, limit = options.limit, "credential batch requested");
    let summary = state.credentials.batch_process(options).await?;
    Ok(Json(summary))
}
