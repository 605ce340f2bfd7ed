use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::score_entry::ScoreEntryError;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
    pub(crate) status: u16,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    BadRequest(String),
    NotFound(String),
    /// Store failure with a message safe to show; the cause is logged where it is built.
    Store(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    /// Log a database error and translate known constraint failures into readable text.
    pub(crate) fn store(err: sqlx::Error, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");

        let described = err.as_database_error().and_then(|db_err| {
            describe_constraint_error(db_err.code().as_deref(), db_err.constraint())
        });

        match described {
            Some(message) => Self::Store(message),
            None => Self::Store(context.to_string()),
        }
    }
}

/// Readable text for the Postgres error codes admins run into on forms.
pub(crate) fn describe_constraint_error(
    code: Option<&str>,
    constraint: Option<&str>,
) -> Option<String> {
    let message = match (code?, constraint.unwrap_or_default()) {
        ("23505", "students_username_key") => "Username is already taken",
        ("23505", "students_registration_number_key") => "Registration number already exists",
        ("23505", "subjects_code_key") => "Subject code already exists",
        ("23505", "classes_teacher_unique") => "Teacher is already assigned to another class",
        ("23505", _) => "A record with these details already exists",
        ("23514", _) => "A value is outside the allowed range",
        ("22P02", _) => "Invalid value for an enumerated field (for example status)",
        ("23503", _) => "A referenced class, subject, student or exam does not exist",
        ("23502", _) => "A required field is missing",
        _ => return None,
    };
    Some(message.to_string())
}

impl From<ScoreEntryError> for ApiError {
    fn from(err: ScoreEntryError) -> Self {
        match err {
            ScoreEntryError::Invalid(message) | ScoreEntryError::NotFound(message) => {
                ApiError::BadRequest(message)
            }
            ScoreEntryError::Store { context, source } => ApiError::store(source, context),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(message) => {
                let status = StatusCode::UNAUTHORIZED;
                let mut response = (
                    status,
                    Json(ErrorResponse { error: message.to_string(), status: status.as_u16() }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                return response;
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Store(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(ErrorResponse { error: message, status: status.as_u16() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn describes_known_constraints() {
        assert_eq!(
            describe_constraint_error(Some("23505"), Some("students_username_key")).as_deref(),
            Some("Username is already taken")
        );
        assert_eq!(
            describe_constraint_error(Some("23505"), Some("other_key")).as_deref(),
            Some("A record with these details already exists")
        );
        assert!(describe_constraint_error(Some("23514"), None).is_some());
        assert!(describe_constraint_error(Some("22P02"), None).unwrap().contains("status"));
        assert!(describe_constraint_error(Some("08006"), None).is_none());
        assert!(describe_constraint_error(None, None).is_none());
    }

    #[test]
    fn score_entry_errors_map_to_statuses() {
        let err: ApiError = ScoreEntryError::NotFound("Subject not found: x".into()).into();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Subject not found: x"));

        let err: ApiError = ScoreEntryError::Store {
            context: "Failed to save scores",
            source: sqlx::Error::PoolClosed,
        }
        .into();
        assert!(matches!(err, ApiError::Store(ref m) if m == "Failed to save scores"));
    }

    #[tokio::test]
    async fn error_body_shape() {
        let response = ApiError::BadRequest("subject_id is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "subject_id is required");
        assert_eq!(json["status"], 400);
    }

    #[test]
    fn unauthorized_sets_challenge_header() {
        let response = ApiError::Unauthorized("Invalid API key").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
