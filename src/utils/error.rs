use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("JSON parse error - {0}")]
    Parse(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("category tree is deeper than {0} levels")]
    CategoryDepth(usize),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Parse(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::CategoryDepth(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = match &self {
            AppError::Validation(errors) => {
                let fields: BTreeMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errs)| {
                        (
                            field.to_string(),
                            errs.iter().map(|e| e.code.to_string()).collect(),
                        )
                    })
                    .collect();
                json!({ "error": self.to_string(), "fields": fields })
            }
            // internals never leak to the client
            AppError::Internal(_) => json!({ "error": "internal server error" }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DieselError> for AppError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => AppError::NotFound("record".to_owned()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                AppError::Conflict(info.message().to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                AppError::BadRequest(info.message().to_owned())
            }
            other => internal_error(other),
        }
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for AppError {
    fn from(err: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        internal_error(err)
    }
}

pub fn internal_error<E>(err: E) -> AppError
where
    E: std::error::Error,
{
    AppError::Internal(err.to_string())
}

pub async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "nothing to see here" })),
    )
}

/// Failures that stop the server before it starts listening.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create db pool: {0}")]
    Pool(String),

    #[error("failed to run migrations: {0}")]
    Migration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
