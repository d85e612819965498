mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = plateful_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = plateful_db::PoolConfig::from_app_config(&config);
    let pool = plateful_db::connect_pool(&config.database_url, pool_config).await?;
    plateful_db::run_migrations(&pool).await?;

    let vision = match config.google_api_key.as_deref() {
        Some(key) => Some(Arc::new(plateful_vision::VisionClient::new(
            key,
            &config.vision_model,
            config.vision_timeout_secs,
            config.vision_max_retries,
            config.vision_retry_backoff_ms,
        )?)),
        None => {
            tracing::warn!("GOOGLE_API_KEY not set; the cuisine-from-image endpoint will answer 503");
            None
        }
    };

    let app = build_app(AppState {
        pool,
        vision,
        nearby_scan_timeout: Duration::from_secs(config.nearby_scan_timeout_secs),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "plateful-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
