use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::modules::auth::model::Claims;
use crate::modules::users::model::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the bearer token and exposes the authenticated
/// user's claims. Role checks happen at the top of each handler, before any
/// business logic runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn username(&self) -> &str {
        &self.0.username
    }

    /// Roles carried by the token. Unknown role names are ignored rather
    /// than rejected, so stale tokens degrade to fewer privileges.
    pub fn roles(&self) -> Vec<Role> {
        self.0
            .roles
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    /// Require that the user holds at least one of `allowed`.
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.iter().any(|role| self.has_role(*role)) {
            return Ok(());
        }
        Err(AppError::forbidden(format!(
            "Access denied. Required roles: {:?}",
            allowed
        )))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(roles: &[&str]) -> AuthUser {
        AuthUser(Claims {
            sub: "7".to_string(),
            username: "alice".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 0,
            iat: 0,
        })
    }

    #[test]
    fn require_any_accepts_any_listed_role() {
        let user = auth_user(&["ROLE_TEACHER"]);
        assert!(user.require_any(&[Role::Admin, Role::Teacher]).is_ok());
    }

    #[test]
    fn require_any_rejects_missing_roles() {
        let user = auth_user(&["ROLE_USER"]);
        assert!(user.require_any(&[Role::Admin]).is_err());
    }

    #[test]
    fn unknown_role_names_are_ignored() {
        let user = auth_user(&["ROLE_WIZARD", "ROLE_ADMIN"]);
        assert_eq!(user.roles(), vec![Role::Admin]);
    }

    #[test]
    fn user_id_parses_subject() {
        assert_eq!(auth_user(&[]).user_id().unwrap(), 7);
    }
}
