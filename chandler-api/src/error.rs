use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chandler_core::DomainError;
use serde_json::json;
use uuid::Uuid;

/// API error surface. Every variant maps to one HTTP status and one stable
/// machine-readable code in the response envelope.
#[derive(Debug)]
pub enum ApiError {
    Validation { field: String, message: String },
    Conflict(String),
    NotFound(String),
    Authorization(String),
    Anyhow(anyhow::Error),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Authorization(_) => "AUTHORIZATION_ERROR",
            ApiError::Anyhow(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { field, message } => ApiError::Validation { field, message },
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::VersionConflict { expected, found } => ApiError::Conflict(format!(
                "version conflict: expected {expected}, found {found}; refresh and retry"
            )),
            err @ DomainError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            DomainError::Authorization(msg) => ApiError::Authorization(msg),
            err @ DomainError::NotFound(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Anyhow(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4();
        let code = self.code();
        let (status, message, details) = match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                format!("validation failed for {field}"),
                vec![json!({ "field": field, "message": message })],
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, vec![]),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, vec![]),
            ApiError::Authorization(msg) => (StatusCode::FORBIDDEN, msg, vec![]),
            ApiError::Anyhow(err) => {
                tracing::error!(request_id = %request_id, "internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    vec![],
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "details": details,
                "requestId": request_id,
            }
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_stable_codes() {
        let err: ApiError = DomainError::validation("title", "must not be empty").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err: ApiError = DomainError::invalid_transition("rfq", "DRAFT", "AWARDED").into();
        assert_eq!(err.code(), "CONFLICT_ERROR");

        let err: ApiError = DomainError::VersionConflict { expected: 1, found: 2 }.into();
        assert_eq!(err.code(), "CONFLICT_ERROR");

        let err: ApiError = DomainError::not_found("RFQ x").into();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
