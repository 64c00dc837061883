use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::json;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::email::model::{
    BulkEmailRequest, HtmlEmailRequest, RecipientRole, RecipientRoleParams, RoleEmailRequest,
    TextEmailRequest,
};
use crate::modules::users::model::Role;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::email::EmailService;
use crate::utils::errors::{AppError, ErrorResponse};
use crate::validator::ValidatedJson;

/// Send a plain-text email to a single recipient
#[utoipa::path(
    post,
    path = "/api/email/text",
    request_body = TextEmailRequest,
    responses(
        (status = 200, description = "Email sent"),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Sending failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, request))]
pub async fn send_text(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(request): ValidatedJson<TextEmailRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let email = EmailService::new(state.email_config.clone());
    email
        .send_text(&request.to, &request.subject, &request.message)
        .await?;

    Ok(Json(json!({"message": "Email sent"})))
}

/// Send an HTML email to a single recipient
#[utoipa::path(
    post,
    path = "/api/email/html",
    request_body = HtmlEmailRequest,
    responses(
        (status = 200, description = "Email sent"),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Sending failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, request))]
pub async fn send_html(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(request): ValidatedJson<HtmlEmailRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let email = EmailService::new(state.email_config.clone());
    email
        .send_html(&request.to, &request.subject, &request.html_content)
        .await?;

    Ok(Json(json!({"message": "Email sent"})))
}

/// Send the same message to an explicit recipient list
#[utoipa::path(
    post,
    path = "/api/email/bulk",
    request_body = BulkEmailRequest,
    responses(
        (status = 200, description = "Bulk send finished"),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Sending failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, request))]
pub async fn send_bulk(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(request): ValidatedJson<BulkEmailRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let email = EmailService::new(state.email_config.clone());
    let sent = email
        .send_bulk(&request.recipients, &request.subject, &request.message)
        .await?;

    Ok(Json(json!({
        "message": "Bulk send finished",
        "sent": sent,
        "requested": request.recipients.len(),
    })))
}

/// Broadcast a message to every user holding a role
///
/// `role` selects the audience: `USER`, `TEACHER`, `ADMIN`, or `ALL`
/// (the default). Responds 400 when no recipient matches.
#[utoipa::path(
    post,
    path = "/api/email/send-to-all",
    params(RecipientRoleParams),
    request_body = RoleEmailRequest,
    responses(
        (status = 200, description = "Broadcast finished"),
        (status = 400, description = "No recipients match the role", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Sending failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, request))]
pub async fn send_to_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<RecipientRoleParams>,
    ValidatedJson(request): ValidatedJson<RoleEmailRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth_user.require_any(&[Role::Admin])?;

    let role = match params.role {
        RecipientRole::All => None,
        RecipientRole::User => Some(Role::User),
        RecipientRole::Teacher => Some(Role::Teacher),
        RecipientRole::Admin => Some(Role::Admin),
    };

    let recipients = UserService::emails_by_role(&state.db, role).await?;
    if recipients.is_empty() {
        return Err(AppError::bad_request("No recipients match the given role"));
    }

    let email = EmailService::new(state.email_config.clone());
    let sent = email
        .send_bulk(&recipients, &request.subject, &request.message)
        .await?;

    Ok(Json(json!({
        "message": "Broadcast finished",
        "sent": sent,
        "requested": recipients.len(),
    })))
}
