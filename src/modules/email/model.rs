use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TextEmailRequest {
    #[validate(email(message = "to must be a valid email address"))]
    pub to: String,
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HtmlEmailRequest {
    #[validate(email(message = "to must be a valid email address"))]
    pub to: String,
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,
    pub html_content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkEmailRequest {
    #[validate(length(min = 1, message = "recipients must not be empty"))]
    pub recipients: Vec<String>,
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,
    pub message: String,
}

/// Audience selector for the send-to-all broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecipientRole {
    #[default]
    All,
    User,
    Teacher,
    Admin,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecipientRoleParams {
    /// Audience: USER, TEACHER, ADMIN, or ALL (the default).
    #[serde(default)]
    pub role: RecipientRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RoleEmailRequest {
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,
    pub message: String,
}
