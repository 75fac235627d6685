use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    /// `message` is what the client shows; `cause` echoes the parser or
    /// rule that rejected the body.
    #[error("{message}")]
    Validation { message: &'static str, cause: String },

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid(cause: impl Into<String>) -> Self {
        AppError::Validation {
            message: "Invalid request",
            cause: cause.into(),
        }
    }

    /// Names the operation a validation failure belongs to, e.g.
    /// "Error creating tour booking". Other variants pass through.
    pub fn while_doing(self, message: &'static str) -> Self {
        match self {
            AppError::Validation { cause, .. } => AppError::Validation { message, cause },
            other => other,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::invalid(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match self {
            AppError::Validation { message, cause } => json!({ "message": message, "error": cause }),
            AppError::Internal(e) => {
                error!("Request failed: {e:#}");
                json!({ "message": "Server Error" })
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
