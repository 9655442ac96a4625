use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/products/margins", get(margin_report))
}

pub async fn margin_report(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.margin_report().await {
        Ok(lines) => (StatusCode::OK, Json(dto::margin_lines_to_json(lines))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
