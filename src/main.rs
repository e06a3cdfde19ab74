//! Friendo Backend - Entry Point
//!
//! Starts the API server with graceful shutdown support. In debug mode the
//! API call capture middleware is installed and the call log file is reset.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod models;
mod sink;

use api::ApiServer;
use config::Config;
use sink::{CallLogSink, FileSink};

#[tokio::main]
async fn main() -> error::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    let default_filter = if config.app.debug {
        "friendo=debug,tower_http=debug"
    } else {
        "friendo=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "{} v{} starting (environment: {})",
        config.app.name, config.app.version, config.app.environment
    );

    // Set up the call log sink. Capture is a development aid: if the sink
    // cannot initialize, the server still starts without it.
    let call_sink: Arc<dyn CallLogSink> = Arc::new(FileSink::new(config.capture_log_file.clone()));
    let mut capture_enabled = false;
    if config.app.debug {
        match call_sink.init().await {
            Ok(()) => {
                capture_enabled = true;
                info!(
                    "API call logging enabled - entries saved to {}",
                    config.capture_log_file.display()
                );
            }
            Err(e) => warn!("API call logging disabled: {}", e),
        }
    }

    // Create API server
    let server = ApiServer::new(config.clone(), call_sink, capture_enabled);

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run(shutdown_rx).await {
            error!("API server error: {}", e);
        }
    });

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = server_task.await;

    info!("{} stopped", config.app.name);
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
