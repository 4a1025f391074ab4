use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(handlers::get_catalog))
        .route("/products", post(handlers::create_product))
        .route("/products/popular", get(handlers::get_popular))
        .route("/products/limited", get(handlers::get_limited))
        .route("/banners", get(handlers::get_banners))
        .route("/sales", get(handlers::get_sales))
        .route(
            "/product/{id}",
            get(handlers::get_product).delete(handlers::delete_product),
        )
}
