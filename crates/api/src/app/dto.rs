//! Request DTOs that have no domain counterpart, plus response helpers.
//!
//! Create/patch payloads deserialize straight into the domain input types
//! (`NewOrder`, `ClientPatch`, ...), and documents are returned in their
//! persisted shape.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    #[serde(alias = "cantidad")]
    pub quantity: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub estado: Option<String>,
}

pub fn ok<T: Serialize>(status: StatusCode, body: T) -> axum::response::Response {
    (status, Json(body)).into_response()
}

pub fn items<T: Serialize>(items: Vec<T>) -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
