use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use sqlx::error::ErrorKind;
use thiserror::Error as ThisError;
use tracing::error;

use crate::patch::{BuildError, DecodeError, InvalidPatchError};

#[derive(Debug, ThisError)]
pub enum GroceryError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid patch: {0}")]
    InvalidPatch(#[from] InvalidPatchError),

    #[error("Statement build error: {0}")]
    Build(#[from] BuildError),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Database error: {0}")]
    DatabaseError(SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SqlxError> for GroceryError {
    fn from(e: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &e
            && (!matches!(db_err.kind(), ErrorKind::Other)
                || db_err.message().contains("constraint failed"))
        {
            return GroceryError::Constraint(db_err.message().to_string());
        }
        GroceryError::DatabaseError(e)
    }
}

impl IntoResponse for GroceryError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            GroceryError::Decode(e) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", e.to_string()),
            GroceryError::InvalidPatch(e) => {
                (StatusCode::BAD_REQUEST, "INVALID_PATCH", e.to_string())
            }
            GroceryError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            GroceryError::Constraint(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            GroceryError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "request body too large".to_string(),
            ),
            GroceryError::Build(_) | GroceryError::DatabaseError(_) | GroceryError::Io(_) => {
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        let body = ApiErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_class() {
        let cases = [
            (GroceryError::Decode(DecodeError::NotAnObject), StatusCode::BAD_REQUEST),
            (
                GroceryError::InvalidPatch(InvalidPatchError::DuplicateKey { column: "id" }),
                StatusCode::BAD_REQUEST,
            ),
            (
                GroceryError::NotFound {
                    entity: "list",
                    key: "id=1".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (GroceryError::Constraint("x".to_string()), StatusCode::CONFLICT),
            (
                GroceryError::Build(BuildError::EmptyChangeSet { table: "list" }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn row_not_found_is_not_a_constraint() {
        let err = GroceryError::from(SqlxError::RowNotFound);
        assert!(matches!(err, GroceryError::DatabaseError(_)));
    }
}
