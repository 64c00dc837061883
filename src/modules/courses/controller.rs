use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::courses::model::{AssignTeacherParams, CourseDto, CourseView};
use crate::modules::courses::service::CourseService;
use crate::modules::users::model::Role;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorResponse};
use crate::utils::pagination::{PageEnvelope, PageQuery};
use crate::validator::ValidatedJson;

/// List all courses
#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "List of courses", body = [CourseView]),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<CourseView>>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let courses = CourseService::get_courses(&state.db).await?;
    Ok(Json(courses))
}

/// Get a course by id
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = CourseView),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CourseView>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let course = CourseService::get_course(&state.db, id).await?;
    Ok(Json(course))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseDto,
    responses(
        (status = 200, description = "Course created successfully", body = CourseView),
        (status = 400, description = "Invalid teacher id", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CourseDto>,
) -> Result<Json<CourseView>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let course = CourseService::create_course(&state.db, dto).await?;
    Ok(Json(course))
}

/// Update a course (replaces scalar fields and the teacher reference)
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    request_body = CourseDto,
    responses(
        (status = 200, description = "Course updated successfully", body = CourseView),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn update_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<CourseDto>,
) -> Result<Json<CourseView>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let course = CourseService::update_course(&state.db, id, dto).await?;
    Ok(Json(course))
}

/// Delete a course
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted successfully"),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    CourseService::delete_course(&state.db, id).await?;
    Ok(Json(json!({"message": "Course deleted successfully"})))
}

/// Assign a teacher to a course
#[utoipa::path(
    post,
    path = "/api/courses/{id}/assign-teacher",
    params(
        ("id" = i64, Path, description = "Course ID"),
        AssignTeacherParams
    ),
    responses(
        (status = 200, description = "Teacher assigned", body = CourseView),
        (status = 400, description = "Invalid course or teacher id", body = ErrorResponse),
        (status = 403, description = "Forbidden - Teacher only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn assign_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Query(params): Query<AssignTeacherParams>,
) -> Result<Json<CourseView>, AppError> {
    auth_user.require_any(&[Role::Teacher])?;

    let course = CourseService::assign_teacher(&state.db, id, params.teacher_id).await?;
    Ok(Json(course))
}

/// Paginated, sorted course listing (no filters)
#[utoipa::path(
    get,
    path = "/api/courses/paginated",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of courses", body = PageEnvelope<CourseView>),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Invalid pagination or sorting parameters", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, paging))]
pub async fn paginated_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(paging): Query<PageQuery>,
) -> Result<Json<PageEnvelope<CourseView>>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let page = CourseService::list_paginated(&state.db, &paging).await?;
    Ok(Json(page))
}

/// Filtered, paginated course listing
///
/// Recognized filters: `title` (exact), `title_like` (case-insensitive
/// substring), `creditHours` (integer exact, skipped when unparseable),
/// `instructorName` (case-insensitive substring on the teacher's
/// username). Unrecognized parameters are ignored.
#[utoipa::path(
    get,
    path = "/api/courses/filter",
    params(
        PageQuery,
        ("title" = Option<String>, Query, description = "Exact title match"),
        ("title_like" = Option<String>, Query, description = "Case-insensitive title substring match"),
        ("creditHours" = Option<String>, Query, description = "Exact credit hours match"),
        ("instructorName" = Option<String>, Query, description = "Case-insensitive teacher username substring match"),
    ),
    responses(
        (status = 200, description = "Page of courses", body = PageEnvelope<CourseView>),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Filtering failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, params, paging))]
pub async fn filter_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<HashMap<String, String>>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<PageEnvelope<CourseView>>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let page = CourseService::list_filtered(&state.db, &params, &paging).await?;
    Ok(Json(page))
}
