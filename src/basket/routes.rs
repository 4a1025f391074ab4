use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route(
        "/basket",
        get(handlers::get_basket)
            .post(handlers::add_to_basket)
            .delete(handlers::remove_from_basket),
    )
}
