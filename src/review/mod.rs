pub mod handlers;
pub mod models;
pub mod rating;
pub mod routes;
