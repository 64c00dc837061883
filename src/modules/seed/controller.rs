use axum::{Json, extract::State};
use serde_json::json;
use tracing::instrument;

use crate::modules::seed::service::SeedService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorResponse};

/// Populate the database with demo users and courses
///
/// Idempotent: rows that already exist are left untouched.
#[utoipa::path(
    post,
    path = "/api/seed",
    responses(
        (status = 200, description = "Seeding finished"),
        (status = 500, description = "Seeding failed", body = ErrorResponse)
    ),
    tag = "Seed"
)]
#[instrument(skip(state))]
pub async fn seed(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let report = SeedService::seed(&state.db).await?;
    Ok(Json(json!({
        "message": "Seeding finished",
        "usersCreated": report.users_created,
        "coursesCreated": report.courses_created,
    })))
}
