use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Enrollment row joined with its student and course.
#[derive(Debug, FromRow)]
pub struct EnrollmentRow {
    pub id: i64,
    pub enrollment_date: NaiveDate,
    pub student_id: i64,
    pub student_username: String,
    pub student_email: String,
    pub course_id: i64,
    pub course_title: String,
}

/// Public view of an enrollment. Student and course appear as flat
/// references; no back-references, so the serialization graph stays
/// acyclic.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    pub id: i64,
    pub student: StudentRef,
    pub course: CourseRef,
    pub enrollment_date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentRef {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseRef {
    pub id: i64,
    pub title: String,
}

impl From<EnrollmentRow> for EnrollmentView {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            student: StudentRef {
                id: row.student_id,
                username: row.student_username,
                email: row.student_email,
            },
            course: CourseRef {
                id: row.course_id,
                title: row.course_title,
            },
            enrollment_date: row.enrollment_date,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub student_id: i64,
    pub course_id: i64,
}

/// Typed filter parameters for the enrollment listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentFilter {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub enrollment_date: Option<NaiveDate>,
}

impl EnrollmentFilter {
    /// Only the filters actually present, for the `filtersApplied` echo.
    pub fn applied(&self) -> serde_json::Value {
        let mut filters = serde_json::Map::new();
        if let Some(student_id) = self.student_id {
            filters.insert("studentId".to_string(), student_id.into());
        }
        if let Some(course_id) = self.course_id {
            filters.insert("courseId".to_string(), course_id.into());
        }
        if let Some(date) = self.enrollment_date {
            filters.insert("enrollmentDate".to_string(), date.to_string().into());
        }
        serde_json::Value::Object(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applied_filters_include_only_present_values() {
        let filter = EnrollmentFilter {
            student_id: Some(3),
            course_id: None,
            enrollment_date: NaiveDate::from_ymd_opt(2025, 9, 1),
        };
        assert_eq!(
            filter.applied(),
            serde_json::json!({"studentId": 3, "enrollmentDate": "2025-09-01"})
        );
    }

    #[test]
    fn empty_filter_echoes_empty_object() {
        assert_eq!(EnrollmentFilter::default().applied(), serde_json::json!({}));
    }
}
