use axum::{Json, extract::State};
use tracing::instrument;

use crate::modules::auth::model::{LoginRequest, RegisterRequest, TokenResponse};
use crate::modules::auth::service::AuthService;
use crate::modules::users::model::Role;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorResponse};
use crate::validator::ValidatedJson;

/// Register a new user (assigns ROLE_USER)
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered, token issued", body = TokenResponse),
        (status = 400, description = "Username or email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = AuthService::register(&state.db, dto, Role::User, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Register a new admin (assigns ROLE_ADMIN; intended for initial setup)
#[utoipa::path(
    post,
    path = "/api/auth/register-admin",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered, token issued", body = TokenResponse),
        (status = 400, description = "Username or email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = AuthService::register(&state.db, dto, Role::Admin, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}
