use sqlx::PgPool;
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::{LoginRequest, RegisterRequest, TokenResponse};
use crate::modules::users::model::Role;
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::verify_password;

pub struct AuthService;

impl AuthService {
    /// Register a new account with the given role and return a fresh token.
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterRequest,
        role: Role,
        jwt_config: &JwtConfig,
    ) -> Result<TokenResponse, AppError> {
        let user =
            UserService::create_user(db, &dto.username, &dto.email, &dto.password, None, role)
                .await?;

        let token = create_access_token(user.id, &user.username, &[role], jwt_config)?;
        Ok(TokenResponse { token })
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<TokenResponse, AppError> {
        let user = UserService::find_by_username(db, &dto.username)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

        if !verify_password(&dto.password, &user.password)? {
            return Err(AppError::unauthorized("Invalid username or password"));
        }

        let roles = UserService::get_roles(db, user.id).await?;
        let token = create_access_token(user.id, &user.username, &roles, jwt_config)?;

        tracing::info!(username = %user.username, "user logged in");
        Ok(TokenResponse { token })
    }
}
