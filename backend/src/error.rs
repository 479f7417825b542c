use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Request-level failure taxonomy. Database and storage details stay in the
/// logs; clients only ever see the shapes below.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("{0}")]
    BusinessRule(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(diesel::result::Error),

    #[error("database connection error: {0}")]
    Connection(#[from] diesel::result::ConnectionError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ApiError::Validation {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the underlying cause is a unique-constraint violation, the
    /// last line of defense against check-then-act races.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            ApiError::Database(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ))
        )
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => ApiError::NotFound("resource not found".to_string()),
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { fields } => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "validation failed", "fields": fields})),
            )
                .into_response(),
            ApiError::BusinessRule(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": message})),
            )
                .into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({"error": message}))).into_response()
            }
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({"error": message}))).into_response()
            }
            ApiError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(json!({"error": message}))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
            }
            ApiError::Storage(message) => {
                log::error!("storage failure: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Storage operation failed"})),
                )
                    .into_response()
            }
            ApiError::Database(err) => {
                log::error!("database failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Database operation failed"})),
                )
                    .into_response()
            }
            ApiError::Connection(err) => {
                log::error!("database connection failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Database connection failed"})),
                )
                    .into_response()
            }
            ApiError::Internal(message) => {
                log::error!("internal failure: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "An internal error occurred"})),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        let err = ApiError::from(diesel::result::Error::NotFound);
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn unique_violations_are_recognized() {
        let err = ApiError::from(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_string()),
        ));
        assert!(err.is_unique_violation());
        assert!(!ApiError::BusinessRule("nope".to_string()).is_unique_violation());
    }

    #[test]
    fn validation_collects_field_names() {
        let err = ApiError::validation(["title", "price_cents"]);
        match err {
            ApiError::Validation { fields } => assert_eq!(fields, vec!["title", "price_cents"]),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
