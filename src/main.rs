//! Binary entry point: wires config, pool, schema bootstrap, templates, and
//! the route table, then serves.

use std::sync::Arc;
use tokio::net::TcpListener;
use weblog::{db, render, routes, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    weblog::logging::init();

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config.db).await?;
    db::ensure_schema(&pool).await?;
    let templates = render::engine(&config.templates_dir)?;

    let bind = config.bind;
    let state = AppState {
        pool,
        config: Arc::new(config),
        templates: Arc::new(templates),
    };
    let app = routes::app(state);

    let listener = TcpListener::bind(bind).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
