use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Course row joined with its (optional) teacher.
#[derive(Debug, FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub credit_hours: Option<i32>,
    pub teacher_id: Option<i64>,
    pub teacher_username: Option<String>,
}

/// Public view of a course. The enrolled-students set is deliberately
/// excluded to keep the serialization graph acyclic.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_hours: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherRef>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherRef {
    pub id: i64,
    pub username: String,
}

impl From<CourseRow> for CourseView {
    fn from(row: CourseRow) -> Self {
        let teacher = match (row.teacher_id, row.teacher_username) {
            (Some(id), Some(username)) => Some(TeacherRef { id, username }),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            credit_hours: row.credit_hours,
            teacher,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    pub credit_hours: Option<i32>,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeacherParams {
    pub teacher_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_drops_dangling_teacher_halves() {
        let row = CourseRow {
            id: 1,
            title: "Algorithms".to_string(),
            description: None,
            credit_hours: Some(3),
            teacher_id: None,
            teacher_username: None,
        };
        let view = CourseView::from(row);
        assert!(view.teacher.is_none());
    }

    #[test]
    fn view_serializes_camel_case() {
        let view = CourseView {
            id: 1,
            title: "Algorithms".to_string(),
            description: None,
            credit_hours: Some(3),
            teacher: Some(TeacherRef {
                id: 2,
                username: "smith".to_string(),
            }),
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["creditHours"], 3);
        assert_eq!(value["teacher"]["username"], "smith");
    }
}
