use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::utils::errors::AppError;

/// JSON extractor that runs the DTO's `validator` rules after
/// deserialization. Body-shape problems (missing or ill-typed fields)
/// come back as 400; rule violations come back as 422 carrying the
/// messages declared on the DTO.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

fn rejection_message(rejection: &JsonRejection) -> String {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return "Missing 'Content-Type: application/json' header".to_string();
    }

    let text = rejection.body_text();
    // serde's "missing field `x`" is the one deserialization error worth
    // relaying with the field name intact.
    if let Some(rest) = text.split("missing field `").nth(1) {
        let field = rest.split('`').next().unwrap_or("unknown");
        return format!("{field} is required");
    }
    if text.contains("invalid type") {
        return "Invalid field type in request".to_string();
    }

    "Invalid request body".to_string()
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    for (field, errors) in errors.field_errors() {
        for error in errors.iter() {
            match &error.message {
                Some(message) => parts.push(message.to_string()),
                None => parts.push(format!("{field} is invalid")),
            }
        }
    }
    parts.join(", ")
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection_message(&rejection)))?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(anyhow!(validation_message(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct SampleDto {
        #[validate(length(min = 1, message = "username must not be empty"))]
        username: String,
        #[validate(email(message = "email must be a valid email address"))]
        email: String,
    }

    #[test]
    fn validation_message_relays_dto_messages() {
        let dto = SampleDto {
            username: String::new(),
            email: "not-an-address".to_string(),
        };
        let message = validation_message(&dto.validate().unwrap_err());
        assert!(message.contains("username must not be empty"));
        assert!(message.contains("email must be a valid email address"));
    }

    #[test]
    fn valid_dto_passes_unchanged() {
        let dto = SampleDto {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(dto.validate().is_ok());
    }
}
