use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use salesdesk_inventory::{NewProduct, ProductId, ProductPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/:id/restock", post(restock_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewProduct>,
) -> axum::response::Response {
    match services.catalog.create_product(body).await {
        Ok(product) => dto::ok(StatusCode::CREATED, product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.list_products().await {
        Ok(products) => dto::items(products),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get_product(id).await {
        Ok(product) => dto::ok(StatusCode::OK, product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<ProductPatch>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.update_product(id, body).await {
        Ok(product) => dto::ok(StatusCode::OK, product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn restock_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.restock(id, body.quantity).await {
        Ok(product) => dto::ok(StatusCode::OK, product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
