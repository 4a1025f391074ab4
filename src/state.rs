use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::{BodyEncoding, Config};
use crate::utils::types::Pool;

/// Request-scoped handles: every handler receives these explicitly.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: Pool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Pool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for BodyEncoding {
    fn from_ref(state: &AppState) -> Self {
        state.config.body_encoding
    }
}
