//! Shared application state for all routes.

use crate::config::AppConfig;
use sqlx::MySqlPool;
use std::sync::Arc;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub config: Arc<AppConfig>,
    pub templates: Arc<Tera>,
}
