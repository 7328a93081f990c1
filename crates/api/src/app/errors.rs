use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use salesdesk_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        ServiceError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", message),
        ServiceError::NotAuthorized => json_error(StatusCode::FORBIDDEN, "not_authorized", message),
        ServiceError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", message)
        }
        ServiceError::Validation { .. } => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        ServiceError::AlreadyExists { .. } => json_error(StatusCode::CONFLICT, "already_exists", message),
        ServiceError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        ServiceError::IntegrityViolation(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "integrity_violation", message)
        }
        ServiceError::StorageUnavailable => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, answering 400 `invalid_id` on failure.
pub fn parse_id<T: core::str::FromStr>(raw: &str, what: &'static str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
