use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use salesdesk_auth::Actor;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(actor): Extension<Actor>) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": actor.id().to_string(),
        "email": actor.email(),
    }))
}
