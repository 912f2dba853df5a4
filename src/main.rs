mod config;
mod message;
mod overlay;
mod render;
mod routes;
mod source;
mod state;
mod widget;

use tracing::{info, warn};

use crate::config::{ConfigError, OverlayConfig};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("surface server failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "failed to load .env");
        }
    }

    let config = OverlayConfig::from_env()?;
    info!(
        source = %config.connection_url,
        display_ms = config.display_duration.as_millis(),
        anchor = config.anchor.as_str(),
        "chat-overlay starting"
    );

    let overlay = widget::mount(&config);
    let app = routes::app(state::AppState::new(&overlay, config.anchor));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(bind = %config.bind, "surface listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    overlay.unmount().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed; shutting down");
    }
    info!("shutdown requested");
}
