use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

/// The closed set of roles. Role names round-trip through the database and
/// JWT claims as their canonical `ROLE_*` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Teacher,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Teacher, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Teacher => "ROLE_TEACHER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role {0:?}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Full user row. Never serialized; responses go through [`StudentView`].
#[derive(Debug, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub user_group: Option<String>,
}

/// Public view of a user: no password, no role set.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct StudentView {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[sqlx(rename = "user_group")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub group: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    /// Omit or leave empty to keep the current password.
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_name_fails_to_parse() {
        assert!("ROLE_JANITOR".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn student_view_hides_absent_group() {
        let view = StudentView {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            group: None,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("group").is_none());
        assert!(value.get("password").is_none());
    }
}
