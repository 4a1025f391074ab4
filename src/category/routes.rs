use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::get_categories).post(handlers::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::get_category_by_id)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
}
