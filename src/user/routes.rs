use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(handlers::get_profile).post(handlers::update_profile),
        )
        .route("/profile/avatar", post(handlers::update_avatar))
}
