use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use property_manager_backend::config::AppConfig;
use property_manager_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting property manager with data directory {:?}", config.data_dir);
    let app_state = initialize_backend(&config).await?;
    let db = app_state.db.clone();

    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            db.close().await;
            return Err(e);
        }
    };
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            db.close().await;
            return Err(e).with_context(|| format!("Failed to bind {}", addr));
        }
    };

    let app = create_router(app_state, &config);
    info!("Server listening on http://{}", addr);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Shutting down, closing database");
    db.close().await;

    if let Err(e) = &result {
        error!("Server error: {}", e);
    }
    result.context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
