use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/tags", get(handlers::get_tags).post(handlers::create_tag))
}
