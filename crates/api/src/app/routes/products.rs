use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use microcommerce_core::ProductId;
use microcommerce_products::{ProductDraft, ProductView};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_products).post(create_product).put(update_product),
        )
        .route("/sorted", get(list_products_by_name))
        .route("/search/min-price/:threshold", get(search_by_min_price))
        .route("/search/name/:term", get(search_by_name))
        .route("/:id", get(get_product).delete(delete_product))
}

fn parse_id(id: &str) -> Result<ProductId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}

fn parse_draft(
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<ProductDraft, axum::response::Response> {
    body.map(|Json(draft)| draft)
        .map_err(errors::json_rejection_to_response)
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.list().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get_by_id(id).await {
        Ok(product) => (StatusCode::OK, Json(ProductView::from(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn search_by_min_price(
    Extension(services): Extension<Arc<AppServices>>,
    Path(threshold): Path<String>,
) -> axum::response::Response {
    let threshold: i64 = match threshold.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_threshold",
                "price threshold must be an integer",
            );
        }
    };
    match services.catalog.search_by_min_price(threshold).await {
        Ok(products) => (StatusCode::OK, Json(dto::products_to_views(products))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn search_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path(term): Path<String>,
) -> axum::response::Response {
    match services.catalog.search_by_name_contains(&term).await {
        Ok(products) => (StatusCode::OK, Json(dto::products_to_views(products))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_products_by_name(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.list_ordered_by_name().await {
        Ok(products) => (StatusCode::OK, Json(dto::products_to_views(products))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> axum::response::Response {
    let draft = match parse_draft(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.create(draft).await {
        Ok(Some(id)) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/products/{id}"))],
            Json(dto::created_to_json(id)),
        )
            .into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> axum::response::Response {
    let draft = match parse_draft(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.update(draft).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
