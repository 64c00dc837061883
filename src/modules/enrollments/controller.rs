use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use tracing::instrument;

use crate::modules::enrollments::model::{EnrollRequest, EnrollmentFilter, EnrollmentView};
use crate::modules::enrollments::service::EnrollmentService;
use crate::middleware::auth::AuthUser;
use crate::modules::users::model::Role;
use crate::state::AppState;
use crate::utils::email::EmailService;
use crate::utils::errors::{AppError, ErrorResponse};
use crate::utils::pagination::{PageEnvelope, PageQuery};

/// Enroll a student in a course and send a notification email
#[utoipa::path(
    post,
    path = "/api/enrollments/enroll",
    params(EnrollRequest),
    responses(
        (status = 200, description = "Student enrolled", body = EnrollmentView),
        (status = 400, description = "Unknown ids, role violation, or already enrolled", body = ErrorResponse),
        (status = 403, description = "Forbidden - User or Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn enroll(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(request): Query<EnrollRequest>,
) -> Result<Json<EnrollmentView>, AppError> {
    auth_user.require_any(&[Role::User, Role::Admin])?;

    let enrollment =
        EnrollmentService::enroll(&state.db, request.student_id, request.course_id).await?;

    // The enrollment is committed at this point; a failed notification is
    // logged, never surfaced.
    if !enrollment.student.email.trim().is_empty() {
        let email = EmailService::new(state.email_config.clone());
        if let Err(e) = email
            .send_enrollment_notice(
                &enrollment.student.email,
                &enrollment.student.username,
                &enrollment.course.title,
            )
            .await
        {
            tracing::warn!(error = %e.error, "failed to send enrollment notification");
        }
    }

    Ok(Json(enrollment))
}

/// Remove an enrollment
#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    params(("id" = i64, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment removed"),
        (status = 403, description = "Forbidden - User or Admin only", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn unenroll(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth_user.require_any(&[Role::User, Role::Admin])?;

    EnrollmentService::unenroll(&state.db, id).await?;
    Ok(Json(json!({"message": "Enrollment removed"})))
}

/// List all enrollments
#[utoipa::path(
    get,
    path = "/api/enrollments",
    responses(
        (status = 200, description = "List of enrollments", body = [EnrollmentView]),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn get_enrollments(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<EnrollmentView>>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let enrollments = EnrollmentService::get_enrollments(&state.db).await?;
    Ok(Json(enrollments))
}

/// Filtered, paginated enrollment listing
///
/// Recognized filters: `studentId`, `courseId` (exact), `enrollmentDate`
/// (exact date, `YYYY-MM-DD`).
#[utoipa::path(
    get,
    path = "/api/enrollments/filter",
    params(PageQuery, EnrollmentFilter),
    responses(
        (status = 200, description = "Page of enrollments", body = PageEnvelope<EnrollmentView>),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Filtering failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, filter, paging))]
pub async fn filter_enrollments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<EnrollmentFilter>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<PageEnvelope<EnrollmentView>>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let page = EnrollmentService::list_filtered(&state.db, &filter, &paging).await?;
    Ok(Json(page))
}
