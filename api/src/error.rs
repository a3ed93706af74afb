use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::models::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("password hash error: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    pub fn not_found(resource: &str, id: i64) -> Self {
        AppError::NotFound(format!("{resource} with id {id} not found"))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(inner: ValidationErrors) -> Self {
        AppError::Validation(inner)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationErrors::single(
            &["body"],
            rejection.body_text(),
            "json_invalid",
        ))
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(ValidationErrors::single(
            &["body"],
            rejection.body_text(),
            "missing",
        ))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(ValidationErrors::single(
            &["query"],
            rejection.body_text(),
            "parsing",
        ))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(ValidationErrors::single(
            &["path"],
            rejection.body_text(),
            "int_parsing",
        ))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Sqlx(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return detail_response(
                            StatusCode::CONFLICT,
                            json!("Resource already exists"),
                        );
                    }
                    if db_err.is_foreign_key_violation() {
                        return detail_response(
                            StatusCode::CONFLICT,
                            json!("Resource is referenced by other records"),
                        );
                    }
                }
                tracing::error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!("Database error"))
            }
            AppError::PasswordHash(e) => {
                tracing::error!(error = %e, "password hashing error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!("Password hashing error"),
                )
            }
            AppError::Jwt(e) => {
                tracing::error!(error = %e, "token signing error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!("Token error"))
            }
            AppError::Auth(auth) => return auth.into_response(),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::to_value(errors).unwrap_or_else(|_| json!("Invalid input")),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!(msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
        };

        detail_response(status, detail)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "detail": self.to_string() }));
        match self {
            // Only the 401s advertise the scheme the client should retry with.
            AuthError::IncorrectCredentials
            | AuthError::MissingCredentials
            | AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                body,
            )
                .into_response(),
            AuthError::InactiveUser => (StatusCode::BAD_REQUEST, body).into_response(),
        }
    }
}

fn detail_response(status: StatusCode, detail: serde_json::Value) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_uses_detail_envelope() {
        let response = AppError::not_found("Customer", 7).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Customer with id 7 not found"})
        );
    }

    #[tokio::test]
    async fn missing_credentials_is_401_with_challenge() {
        let response = AppError::Auth(AuthError::MissingCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert_eq!(body_json(response).await, json!({"detail": "Not authenticated"}));
    }

    #[tokio::test]
    async fn inactive_user_is_400() {
        let response = AppError::Auth(AuthError::InactiveUser).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        let errors = ValidationErrors::single(&["body", "price"], "too low", "greater_than");
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["detail"][0]["loc"], json!(["body", "price"]));
    }

    #[tokio::test]
    async fn database_failures_do_not_leak_details() {
        let response = AppError::Sqlx(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"detail": "Database error"}));
    }
}
