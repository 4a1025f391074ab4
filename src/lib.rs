use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod basket;
pub mod category;
pub mod config;
pub mod order;
pub mod payment;
pub mod pool;
pub mod product;
pub mod review;
pub mod schema;
pub mod state;
pub mod tag;
pub mod user;
pub mod utils;

use state::AppState;

/// Every route under `/api`, with tracing and CORS applied.
pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        .merge(category::routes::get_routes())
        .merge(product::routes::get_routes())
        .merge(review::routes::get_routes())
        .merge(tag::routes::get_routes())
        .merge(basket::routes::get_routes())
        .merge(order::routes::get_routes())
        .merge(payment::routes::get_routes())
        .merge(user::routes::get_routes());

    Router::new()
        .nest("/api", routes)
        .fallback(utils::handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
