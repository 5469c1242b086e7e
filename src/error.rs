use axum::{
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::credentials::TokenError;
use crate::database::StoreError;
use crate::utils::{error_codes, error_to_api_response};

/// Failure kinds returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("incorrect password")]
    IncorrectPassword,
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::AlreadyExists => ServiceError::AlreadyExists,
            StoreError::Internal(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => ServiceError::Unauthorized,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// HTTP-facing error. Handlers return `Result<_, AppError>`.
#[derive(Debug)]
pub enum AppError {
    Service(ServiceError),
    InvalidToken,
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Service(ServiceError::InvalidArguments(rejection.body_text()))
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Service(ServiceError::InvalidArguments(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Service(ServiceError::InvalidArguments(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                error_codes::PERMISSION_DENIED,
                "invalid or expired token".to_string(),
            ),
            AppError::Service(err) => match err {
                ServiceError::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    error_codes::PERMISSION_DENIED,
                    "unauthorized".to_string(),
                ),
                ServiceError::NotFound => (
                    StatusCode::NOT_FOUND,
                    error_codes::NOT_FOUND,
                    "not found".to_string(),
                ),
                ServiceError::AlreadyExists => (
                    StatusCode::CONFLICT,
                    error_codes::ALREADY_EXISTS,
                    "already exists".to_string(),
                ),
                ServiceError::InvalidArguments(msg) => {
                    (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, msg)
                }
                ServiceError::IncorrectPassword => (
                    StatusCode::BAD_REQUEST,
                    error_codes::AUTH_FAILED,
                    "incorrect password".to_string(),
                ),
                ServiceError::Internal(detail) => {
                    tracing::error!(%detail, "internal error while handling request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        error_codes::INTERNAL_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        };

        (status, error_to_api_response::<()>(code, msg)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(status_of(ServiceError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ServiceError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ServiceError::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(
            status_of(ServiceError::invalid("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::IncorrectPassword),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::internal("db down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_errors_keep_their_kind() {
        assert!(matches!(
            ServiceError::from(StoreError::AlreadyExists),
            ServiceError::AlreadyExists
        ));
        assert!(matches!(
            ServiceError::from(StoreError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Internal("x".into())),
            ServiceError::Internal(_)
        ));
    }
}
