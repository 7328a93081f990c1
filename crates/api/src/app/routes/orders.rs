use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use salesdesk_auth::Actor;
use salesdesk_sales::{NewOrder, OrderId, OrderPatch, OrderStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<NewOrder>,
) -> axum::response::Response {
    match services.orders.create_order(&actor, body).await {
        Ok(order) => dto::ok(StatusCode::CREATED, order),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// The caller's orders, optionally narrowed to one status (`?estado=`).
pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<dto::ListOrdersQuery>,
) -> axum::response::Response {
    let result = match query.estado.as_deref() {
        None => services.orders.list_orders_by_owner(&actor).await,
        Some(raw) => {
            let status: OrderStatus = match raw.parse() {
                Ok(s) => s,
                Err(e) => {
                    return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", format!("{e}"));
                }
            };
            services.orders.list_orders_by_owner_and_status(&actor, status).await
        }
    };

    match result {
        Ok(orders) => dto::items(orders),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.orders.get_order(&actor, id).await {
        Ok(order) => dto::ok(StatusCode::OK, order),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<OrderPatch>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.orders.update_order(&actor, id, body).await {
        Ok(order) => dto::ok(StatusCode::OK, order),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.orders.delete_order(&actor, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
