use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use validator::ValidationErrors;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("form validation failed: {0}")]
    InvalidForm(ValidationErrors),
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
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
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
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

    /// Per-field errors collected by form validation, if that is what failed.
    pub fn form_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::InvalidForm(errors) => Some(errors),
            _ => None,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String, Value) {
        match self {
            AppError::InvalidForm(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_form",
                "Form validation failed".to_string(),
                form_details(errors),
            ),
            AppError::NotFound { message, details } => (
                StatusCode::NOT_FOUND,
                "not_found",
                message.clone(),
                details.clone(),
            ),
            AppError::Conflict { message, details } => (
                StatusCode::CONFLICT,
                "conflict",
                message.clone(),
                details.clone(),
            ),
            AppError::Unauthorized { message, details } => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                message.clone(),
                details.clone(),
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message.clone(),
                details.clone(),
            ),
        }
    }
}

/// Flattens collected field errors into `{ field: [{ code, message, params }] }`.
fn form_details(errors: &ValidationErrors) -> Value {
    let mut fields = Map::new();
    for (field, errs) in errors.field_errors() {
        let items = errs
            .iter()
            .map(|e| {
                json!({
                    "code": e.code,
                    "message": e.message,
                    "params": e.params,
                })
            })
            .collect();
        fields.insert(field.to_string(), Value::Array(items));
    }
    Value::Object(fields)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

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

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::InvalidForm(errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
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

    tracing::error!("Database error: {}", e);
    AppError::internal("Database error", json!({}))
}
