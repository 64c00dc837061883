use anyhow::Context;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::modules::enrollments::model::{EnrollmentFilter, EnrollmentRow, EnrollmentView};
use crate::modules::users::model::Role;
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;
use crate::utils::filter::fetch_page;
use crate::utils::pagination::{PageEnvelope, PageQuery};

const ENROLLMENT_SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "e.id"),
    ("enrollmentDate", "e.enrollment_date"),
    ("studentId", "e.student_id"),
    ("courseId", "e.course_id"),
];

const ENROLLMENT_SELECT: &str = "SELECT e.id, e.enrollment_date, \
     s.id AS student_id, s.username AS student_username, s.email AS student_email, \
     c.id AS course_id, c.title AS course_title \
     FROM enrollments e \
     JOIN users s ON s.id = e.student_id \
     JOIN courses c ON c.id = e.course_id WHERE TRUE";

const ENROLLMENT_COUNT: &str = "SELECT COUNT(*) FROM enrollments e WHERE TRUE";

fn push_enrollment_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &EnrollmentFilter) {
    if let Some(student_id) = filter.student_id {
        builder.push(" AND e.student_id = ");
        builder.push_bind(student_id);
    }
    if let Some(course_id) = filter.course_id {
        builder.push(" AND e.course_id = ");
        builder.push_bind(course_id);
    }
    if let Some(date) = filter.enrollment_date {
        builder.push(" AND e.enrollment_date = ");
        builder.push_bind(date);
    }
}

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enroll a student in a course, dated today.
    ///
    /// The insert goes through `ON CONFLICT DO NOTHING` against the
    /// (student_id, course_id) unique index, so two racing enroll attempts
    /// for the same pair cannot both succeed.
    #[instrument(skip(db))]
    pub async fn enroll(
        db: &PgPool,
        student_id: i64,
        course_id: i64,
    ) -> Result<EnrollmentView, AppError> {
        let student = UserService::find_by_id(db, student_id).await?;
        let course_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(db)
                .await
                .context("Failed to check course existence")
                .map_err(AppError::database)?;

        let Some(student) = student else {
            return Err(AppError::bad_request("Invalid studentId or courseId"));
        };
        if !course_exists {
            return Err(AppError::bad_request("Invalid studentId or courseId"));
        }

        let roles = UserService::get_roles(db, student.id).await?;
        if roles.contains(&Role::Teacher) || roles.contains(&Role::Admin) {
            return Err(AppError::bad_request(
                "Teachers and admins cannot be enrolled in courses",
            ));
        }

        let enrollment_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO enrollments (student_id, course_id, enrollment_date)
             VALUES ($1, $2, $3)
             ON CONFLICT (student_id, course_id) DO NOTHING
             RETURNING id",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(Utc::now().date_naive())
        .fetch_optional(db)
        .await
        .context("Failed to insert enrollment")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::bad_request("Student is already enrolled in this course"))?;

        Self::get_enrollment(db, enrollment_id).await
    }

    #[instrument(skip(db))]
    pub async fn unenroll(db: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete enrollment")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Enrollment not found"));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment(db: &PgPool, id: i64) -> Result<EnrollmentView, AppError> {
        let row = sqlx::query_as::<_, EnrollmentRow>(&format!("{ENROLLMENT_SELECT} AND e.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch enrollment")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found("Enrollment not found"))?;

        Ok(row.into())
    }

    #[instrument(skip(db))]
    pub async fn get_enrollments(db: &PgPool) -> Result<Vec<EnrollmentView>, AppError> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(&format!("{ENROLLMENT_SELECT} ORDER BY e.id"))
            .fetch_all(db)
            .await
            .context("Failed to fetch enrollments")
            .map_err(AppError::database)?;

        Ok(rows.into_iter().map(EnrollmentView::from).collect())
    }

    /// Filtered, paginated enrollment listing.
    #[instrument(skip(db, filter, paging))]
    pub async fn list_filtered(
        db: &PgPool,
        filter: &EnrollmentFilter,
        paging: &PageQuery,
    ) -> Result<PageEnvelope<EnrollmentView>, AppError> {
        let request = paging
            .resolve("id,asc", ENROLLMENT_SORT_COLUMNS, "e.id")
            .map_err(|e| {
                tracing::error!(error = %e, "invalid enrollment paging parameters");
                AppError::internal("Filtering failed")
            })?;

        let mut count = QueryBuilder::<Postgres>::new(ENROLLMENT_COUNT);
        push_enrollment_filters(&mut count, filter);

        let mut select = QueryBuilder::<Postgres>::new(ENROLLMENT_SELECT);
        push_enrollment_filters(&mut select, filter);

        let page = fetch_page::<EnrollmentRow>(db, count, select, &request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "enrollment filter query failed");
                AppError::internal("Filtering failed")
            })?;

        let content: Vec<EnrollmentView> =
            page.rows.into_iter().map(EnrollmentView::from).collect();
        Ok(PageEnvelope::new(content, &request, page.total).with_filters(filter.applied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn typed_filters_compose_conjunctively() {
        let filter = EnrollmentFilter {
            student_id: Some(1),
            course_id: Some(2),
            enrollment_date: NaiveDate::from_ymd_opt(2025, 9, 1),
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM enrollments e WHERE TRUE");
        push_enrollment_filters(&mut builder, &filter);
        let sql = builder.into_sql();
        assert!(sql.contains("AND e.student_id = $1"));
        assert!(sql.contains("AND e.course_id = $2"));
        assert!(sql.contains("AND e.enrollment_date = $3"));
    }

    #[test]
    fn absent_filters_leave_identity_predicate() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM enrollments e WHERE TRUE");
        push_enrollment_filters(&mut builder, &EnrollmentFilter::default());
        assert_eq!(builder.into_sql(), "SELECT 1 FROM enrollments e WHERE TRUE");
    }
}
