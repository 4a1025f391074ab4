use axum::{Router, routing::post};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/payment/{id}", post(handlers::capture_payment))
}
