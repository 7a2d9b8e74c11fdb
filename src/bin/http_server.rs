//! Macro Planner HTTP API server

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use macro_planner::config::AppConfig;
use macro_planner::http::{build_app, shutdown_signal, AppState};
use macro_planner::tools::status::StatusTracker;
use macro_planner::{build_info, db};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("macro_planner=info"))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    build_info::print_startup_banner("HTTP");

    let config = AppConfig::from_env()?;
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&config.database_path)?;
    database.with_conn(db::migrations::run_migrations)?;

    let state = AppState {
        database,
        settings: config.estimator,
        status: Arc::new(StatusTracker::new(
            config.database_path.clone(),
            config.estimator,
        )),
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    tracing::info!(addr = %config.http_addr, database = %config.database_path.display(), "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
