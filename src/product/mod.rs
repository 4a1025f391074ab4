pub mod filters;
pub mod handlers;
pub mod models;
pub mod queries;
pub mod routes;
pub mod views;
