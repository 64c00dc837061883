use std::collections::HashMap;

use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::modules::courses::model::{CourseDto, CourseRow, CourseView};
use crate::utils::errors::AppError;
use crate::utils::filter::{FilterRule, Matcher, echo_params, fetch_page, push_filters, rule};
use crate::utils::pagination::{PageEnvelope, PageQuery};

const COURSE_FILTERS: &[FilterRule] = &[
    rule("title", "c.title", Matcher::Exact),
    rule("title_like", "c.title", Matcher::Contains),
    rule("creditHours", "c.credit_hours", Matcher::IntExact),
    // Left join: courses without a teacher only drop out when this
    // filter is present.
    rule("instructorName", "t.username", Matcher::Contains),
];

const COURSE_SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "c.id"),
    ("title", "c.title"),
    ("description", "c.description"),
    ("creditHours", "c.credit_hours"),
];

const COURSE_SELECT: &str = "SELECT c.id, c.title, c.description, c.credit_hours, \
     t.id AS teacher_id, t.username AS teacher_username \
     FROM courses c LEFT JOIN users t ON t.id = c.teacher_id WHERE TRUE";

const COURSE_COUNT: &str =
    "SELECT COUNT(*) FROM courses c LEFT JOIN users t ON t.id = c.teacher_id WHERE TRUE";

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db))]
    pub async fn get_courses(db: &PgPool) -> Result<Vec<CourseView>, AppError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!("{COURSE_SELECT} ORDER BY c.id"))
            .fetch_all(db)
            .await
            .context("Failed to fetch courses")
            .map_err(AppError::database)?;

        Ok(rows.into_iter().map(CourseView::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: i64) -> Result<CourseView, AppError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!("{COURSE_SELECT} AND c.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch course")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found("Course not found"))?;

        Ok(row.into())
    }

    #[instrument(skip(db, dto))]
    pub async fn create_course(db: &PgPool, dto: CourseDto) -> Result<CourseView, AppError> {
        if let Some(teacher_id) = dto.teacher_id {
            Self::ensure_user_exists(db, teacher_id).await?;
        }

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO courses (title, description, credit_hours, teacher_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.credit_hours)
        .bind(dto.teacher_id)
        .fetch_one(db)
        .await
        .context("Failed to create course")
        .map_err(AppError::database)?;

        Self::get_course(db, id).await
    }

    /// Replaces all scalar fields and the teacher reference.
    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        id: i64,
        dto: CourseDto,
    ) -> Result<CourseView, AppError> {
        if let Some(teacher_id) = dto.teacher_id {
            Self::ensure_user_exists(db, teacher_id).await?;
        }

        let result = sqlx::query(
            "UPDATE courses SET title = $1, description = $2, credit_hours = $3, teacher_id = $4
             WHERE id = $5",
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.credit_hours)
        .bind(dto.teacher_id)
        .bind(id)
        .execute(db)
        .await
        .context("Failed to update course")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Course not found"));
        }

        Self::get_course(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete course")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Course not found"));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn assign_teacher(
        db: &PgPool,
        course_id: i64,
        teacher_id: i64,
    ) -> Result<CourseView, AppError> {
        Self::ensure_user_exists(db, teacher_id).await?;

        let result = sqlx::query("UPDATE courses SET teacher_id = $1 WHERE id = $2")
            .bind(teacher_id)
            .bind(course_id)
            .execute(db)
            .await
            .context("Failed to assign teacher")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request("Invalid course id"));
        }

        Self::get_course(db, course_id).await
    }

    /// Paginated, sorted course listing without filters.
    #[instrument(skip(db, paging))]
    pub async fn list_paginated(
        db: &PgPool,
        paging: &PageQuery,
    ) -> Result<PageEnvelope<CourseView>, AppError> {
        let request = paging
            .resolve("title,asc", COURSE_SORT_COLUMNS, "c.id")
            .map_err(|e| {
                tracing::error!(error = %e, "invalid course paging parameters");
                AppError::internal("Invalid pagination or sorting parameters")
            })?;

        let count = QueryBuilder::<Postgres>::new(COURSE_COUNT);
        let select = QueryBuilder::<Postgres>::new(COURSE_SELECT);

        let page = fetch_page::<CourseRow>(db, count, select, &request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "paginated course query failed");
                AppError::internal("Invalid pagination or sorting parameters")
            })?;

        let content = page.rows.into_iter().map(CourseView::from).collect();
        Ok(PageEnvelope::new(content, &request, page.total))
    }

    /// Filtered, paginated course listing.
    #[instrument(skip(db, params, paging))]
    pub async fn list_filtered(
        db: &PgPool,
        params: &HashMap<String, String>,
        paging: &PageQuery,
    ) -> Result<PageEnvelope<CourseView>, AppError> {
        let request = paging
            .resolve("id,asc", COURSE_SORT_COLUMNS, "c.id")
            .map_err(|e| {
                tracing::error!(error = %e, "invalid course paging parameters");
                AppError::internal("Filtering failed")
            })?;

        let mut count = QueryBuilder::<Postgres>::new(COURSE_COUNT);
        push_filters(&mut count, COURSE_FILTERS, params);

        let mut select = QueryBuilder::<Postgres>::new(COURSE_SELECT);
        push_filters(&mut select, COURSE_FILTERS, params);

        let page = fetch_page::<CourseRow>(db, count, select, &request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "course filter query failed");
                AppError::internal("Filtering failed")
            })?;

        let content: Vec<CourseView> = page.rows.into_iter().map(CourseView::from).collect();
        Ok(PageEnvelope::new(content, &request, page.total).with_filters(echo_params(params)))
    }

    async fn ensure_user_exists(db: &PgPool, user_id: i64) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(db)
            .await
            .context("Failed to check user existence")
            .map_err(AppError::database)?;

        if !exists {
            return Err(AppError::bad_request("Invalid teacher id"));
        }

        Ok(())
    }
}
