use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Application error taxonomy.
///
/// `Forbidden` is only observable on authenticated stat/write paths; the
/// redirect handler collapses it to `NotFound` so a denied private link is
/// indistinguishable from a nonexistent one.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Forbidden { message: String, details: Value },
    Conflict { message: String, details: Value },
    /// The code generator exhausted its collision-retry budget. Retryable.
    CodeExhausted { message: String, details: Value },
    /// Cache or store transiently unreachable on a path with no fallback left.
    Unavailable { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn code_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::CodeExhausted {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Masks this error as a generic not-found response.
    ///
    /// Used by anonymous read paths where revealing that a link exists but is
    /// private would leak existence.
    pub fn mask_not_found(self) -> Self {
        match self {
            Self::Forbidden { .. } => Self::not_found("Short link not found", json!({})),
            other => other,
        }
    }

    fn parts(&self) -> (&'static str, &str) {
        match self {
            Self::Validation { message, .. } => ("validation_error", message),
            Self::NotFound { message, .. } => ("not_found", message),
            Self::Forbidden { message, .. } => ("forbidden", message),
            Self::Conflict { message, .. } => ("conflict", message),
            Self::CodeExhausted { message, .. } => ("code_exhausted", message),
            Self::Unavailable { message, .. } => ("unavailable", message),
            Self::Internal { message, .. } => ("internal_error", message),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (code, message) = self.parts();
        write!(f, "{}: {}", code, message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Forbidden { message, details } => {
                (StatusCode::FORBIDDEN, "forbidden", message, details)
            }
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::CodeExhausted { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "code_exhausted",
                message,
                details,
            ),
            AppError::Unavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    if matches!(e, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) {
        return AppError::unavailable("Database unreachable", json!({}));
    }

    AppError::internal("Database error", json!({}))
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&e).unwrap_or(Value::Null);
        AppError::bad_request("Validation failed", details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_not_found_hides_forbidden() {
        let err = AppError::forbidden("No access to this link", json!({ "short_code": "abc" }));
        let masked = err.mask_not_found();
        match masked {
            AppError::NotFound { message, details } => {
                // nothing from the denied link may survive into the body
                assert_eq!(message, "Short link not found");
                assert_eq!(details, json!({}));
            }
            other => panic!("expected NotFound, got {other}"),
        }
    }

    #[test]
    fn test_mask_not_found_leaves_others() {
        let err = AppError::conflict("taken", json!({}));
        assert!(matches!(err.mask_not_found(), AppError::Conflict { .. }));
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::code_exhausted("no free code", json!({}));
        assert!(err.to_string().contains("code_exhausted"));
    }
}
