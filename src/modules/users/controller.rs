use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::{CreateStudentDto, Role, StudentView, UpdateStudentDto};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorResponse};
use crate::utils::pagination::{PageEnvelope, PageQuery};
use crate::validator::ValidatedJson;

/// Create a new student (assigns ROLE_USER)
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 200, description = "Student created successfully", body = StudentView),
        (status = 400, description = "Username or email already taken", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<Json<StudentView>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let student = UserService::create_student(&state.db, dto).await?;
    Ok(Json(student))
}

/// List all students
#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "List of students", body = [StudentView]),
        (status = 403, description = "Forbidden - Admin or Teacher only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<StudentView>>, AppError> {
    auth_user.require_any(&[Role::Admin, Role::Teacher])?;

    let students = UserService::get_students(&state.db).await?;
    Ok(Json(students))
}

/// Get a student by id
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = StudentView),
        (status = 403, description = "Forbidden - Admin or Teacher only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<StudentView>, AppError> {
    auth_user.require_any(&[Role::Admin, Role::Teacher])?;

    let student = UserService::get_student(&state.db, id).await?;
    Ok(Json(student))
}

/// Update a student's username and optionally password
#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated successfully", body = StudentView),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<StudentView>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let student = UserService::update_student(&state.db, id, dto).await?;
    Ok(Json(student))
}

/// Delete a student
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted successfully"),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    UserService::delete_student(&state.db, id).await?;
    Ok(Json(json!({"message": "Student deleted successfully"})))
}

/// Filtered, paginated student listing
///
/// Recognized filters: `name`, `email`, `group` (case-insensitive exact)
/// and `name_like` (case-insensitive username prefix). Unrecognized
/// parameters are ignored.
#[utoipa::path(
    get,
    path = "/api/students/filter",
    params(
        PageQuery,
        ("name" = Option<String>, Query, description = "Case-insensitive exact username match"),
        ("email" = Option<String>, Query, description = "Case-insensitive exact email match"),
        ("group" = Option<String>, Query, description = "Case-insensitive exact group match"),
        ("name_like" = Option<String>, Query, description = "Case-insensitive username prefix match"),
    ),
    responses(
        (status = 200, description = "Page of students", body = PageEnvelope<StudentView>),
        (status = 403, description = "Forbidden - Admin or Teacher only", body = ErrorResponse),
        (status = 500, description = "Filtering failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, params, paging))]
pub async fn filter_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<HashMap<String, String>>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<PageEnvelope<StudentView>>, AppError> {
    auth_user.require_any(&[Role::Admin, Role::Teacher])?;

    let page = UserService::list_students_filtered(&state.db, &params, &paging).await?;
    Ok(Json(page))
}
