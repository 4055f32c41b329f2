//! Error taxonomy shared by every service.
//!
//! Each variant carries a stable machine-readable code (`ARTICLE_NOT_FOUND`,
//! `ACCESS_DENIED`, ...) and a human-readable message. Store failures are
//! collapsed into [`ServiceError::Internal`] so nothing about the database
//! leaks into a response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::utils::api_response::ResponseBuilder;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Unauthenticated { code: &'static str, message: String },

    #[error("{message}")]
    Forbidden { code: &'static str, message: String },

    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound { code, message: message.into() }
    }

    pub fn unauthenticated() -> Self {
        Self::Unauthenticated {
            code: "AUTH_REQUIRED",
            message: "Authentication is required".to_string(),
        }
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::Forbidden { code, message: message.into() }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest { code, message: message.into() }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict { code, message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ServiceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound { code, .. }
            | ServiceError::Unauthenticated { code, .. }
            | ServiceError::Forbidden { code, .. }
            | ServiceError::BadRequest { code, .. }
            | ServiceError::Conflict { code, .. } => code,
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to hand to a client.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }

    /// True when a store error came from a unique index.
    pub fn is_unique_violation(err: &DbErr) -> bool {
        matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        tracing::error!("Database error: {}", err);
        ServiceError::Internal(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        ResponseBuilder::error::<()>(self.status(), self.code(), &self.public_message()).into_response()
    }
}
