use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use salesdesk_auth::Actor;
use salesdesk_parties::{ClientId, ClientPatch, NewClient};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_client).get(list_clients))
        .route("/:id", get(get_client).put(update_client).delete(delete_client))
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<NewClient>,
) -> axum::response::Response {
    match services.clients.create_client(&actor, body).await {
        Ok(client) => dto::ok(StatusCode::CREATED, client),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// The caller's own clients.
pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
) -> axum::response::Response {
    match services.clients.list_clients(&actor).await {
        Ok(clients) => dto::items(clients),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.clients.get_client(&actor, id).await {
        Ok(client) => dto::ok(StatusCode::OK, client),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<ClientPatch>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.clients.update_client(&actor, id, body).await {
        Ok(client) => dto::ok(StatusCode::OK, client),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.clients.delete_client(&actor, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
