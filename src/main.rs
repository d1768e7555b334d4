use std::sync::Arc;

use anyhow::Context;
use shortly::{config::AppConfig, db, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be populated
    dotenvy::dotenv().ok();

    // Per-request tracing stays off unless RUST_LOG enables tower_http
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shortly=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Storage problems are fatal: refuse to start
    let pool = db::connect(&config.storage_path)
        .await
        .with_context(|| format!("cannot open database {}", config.storage_path.display()))?;
    db::ensure_schema(&pool)
        .await
        .context("cannot create the urls table")?;
    tracing::debug!("Database ready at {}", config.storage_path.display());

    let bind_addr = format!("{}:{}", config.host, config.port);
    let port = config.port;
    let state = Arc::new(AppState::new(pool, config));
    let app = shortly::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("cannot bind {bind_addr}"))?;
    tracing::info!(
        "URL shortener running at http://localhost:{} (Press Ctrl+C to stop)",
        port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down server");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
