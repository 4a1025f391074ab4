use axum::{Router, routing::post};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/product/{id}/reviews", post(handlers::submit_review))
}
