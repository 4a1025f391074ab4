pub mod models;

pub use models::{CurrentUser, User};
