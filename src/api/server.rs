//! API server using Axum
//!
//! Assembles the router, installs the capture middleware when enabled, and
//! runs the HTTP server with graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{FriendoError, Result};
use crate::sink::CallLogSink;

use super::middleware::{cors_layer, log_api_call};
use super::routes;

/// Shared state for API handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub call_sink: Arc<dyn CallLogSink>,
}

/// API server
pub struct ApiServer {
    state: AppState,
    capture_enabled: bool,
}

impl ApiServer {
    /// Create a new API server
    ///
    /// `capture_enabled` installs the call capture middleware; the caller
    /// decides based on the debug flag and whether the sink initialized.
    pub fn new(config: Config, call_sink: Arc<dyn CallLogSink>, capture_enabled: bool) -> Self {
        let state = AppState { config, call_sink };

        Self {
            state,
            capture_enabled,
        }
    }

    /// Build the router
    fn build_router(&self) -> Router {
        let cors = cors_layer(&self.state.config.cors_origins);

        let mut router = routes::create_router(self.state.clone());

        if self.capture_enabled {
            router = router.layer(from_fn_with_state(self.state.clone(), log_api_call));
        }

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = self
            .state
            .config
            .server_addr()
            .parse()
            .map_err(|_| FriendoError::InvalidConfig("Invalid server address".into()))?;

        let router = self.build_router();

        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| FriendoError::Internal(e.to_string()))?;

        info!("API server shut down");
        Ok(())
    }
}
