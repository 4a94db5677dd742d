use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{CreateStudentRequest, CreatedStudentResponse, EligibilityResponse, UpdateEligibilityRequest};
use super::repo;
use super::repo_types::StudentWithRelations;
use super::services::{create_student as create, validate};
use crate::{auth::extractors::StaffUser, error::AppError, state::AppState};

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/students", post(create_student))
        .route("/students/:id", get(get_student))
        .route("/students/:id/eligibility", put(update_eligibility))
}

#[instrument(skip(state, _staff, payload))]
pub async fn create_student(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<CreatedStudentResponse>), AppError> {
    let new = validate(payload)?;
    let (student, user) = create(&state, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedStudentResponse {
            student,
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, _staff))]
pub async fn get_student(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<StudentWithRelations>, AppError> {
    repo::find_with_relations(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Student {id} not found")))
}

#[instrument(skip(state, staff, payload))]
pub async fn update_eligibility(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEligibilityRequest>,
) -> Result<Json<EligibilityResponse>, AppError> {
    if repo::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("Student {id} not found")));
    }
    let row = repo::upsert_eligibility(&state.db, id, &payload.into()).await?;
    info!(student_id = id, staff_id = staff.sub, overall_status = %row.overall_status, "eligibility updated");
    Ok(Json(EligibilityResponse {
        success: true,
        data: row,
    }))
}
