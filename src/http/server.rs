use crate::{
    config::ServerConfig,
    controller::StateController,
    error::{Result, ServerError, StategateError},
    probe::SystemProbe,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{
    api_handler, get_state_handler, health_handler, put_state_handler, request_handler,
    run_log_handler, stop_handler,
};

/// Shared state for the Axum server
#[derive(Clone)]
pub struct ServerState {
    pub(crate) controller: Arc<StateController>,
    pub(crate) probe: Arc<dyn SystemProbe>,
}

/// Build the router serving the lifecycle endpoints
pub fn router(controller: Arc<StateController>, probe: Arc<dyn SystemProbe>) -> Router {
    let state = ServerState { controller, probe };

    Router::new()
        .route("/state", get(get_state_handler).put(put_state_handler))
        .route("/request", get(request_handler))
        .route("/run-log", get(run_log_handler))
        .route("/api", get(api_handler))
        .route("/health", get(health_handler))
        .route("/stop", post(stop_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP front end for the state controller
pub struct ControlServer {
    pub(crate) config: ServerConfig,
    pub(crate) controller: Arc<StateController>,
    pub(crate) probe: Arc<dyn SystemProbe>,
}

impl ControlServer {
    pub fn new(
        config: ServerConfig,
        controller: Arc<StateController>,
        probe: Arc<dyn SystemProbe>,
    ) -> Self {
        Self {
            config,
            controller,
            probe,
        }
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.address();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::BindFailed {
                address: addr.clone(),
                source: e,
            })?;

        info!("Control server listening on {}", local_addr(&listener)?);
        Ok(listener)
    }

    /// Serve on `listener` until `shutdown` is cancelled
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        let app = router(Arc::clone(&self.controller), Arc::clone(&self.probe));

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| ServerError::StartupFailed {
                details: format!("Server error: {}", e),
            })?;

        info!("Control server stopped");
        Ok(())
    }
}

pub(crate) fn local_addr(listener: &TcpListener) -> Result<SocketAddr> {
    listener.local_addr().map_err(|e| {
        StategateError::Server(ServerError::StartupFailed {
            details: format!("Listener has no local address: {}", e),
        })
    })
}

/// Control server builder for configuration
pub struct ControlServerBuilder {
    config: Option<ServerConfig>,
    controller: Option<Arc<StateController>>,
    probe: Option<Arc<dyn SystemProbe>>,
}

impl ControlServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            controller: None,
            probe: None,
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn controller(mut self, controller: Arc<StateController>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn probe(mut self, probe: Arc<dyn SystemProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Build the control server
    pub fn build(self) -> Result<ControlServer> {
        let config = self.config.ok_or_else(|| {
            StategateError::Server(ServerError::StartupFailed {
                details: "Server configuration is required".to_string(),
            })
        })?;

        let controller = self.controller.ok_or_else(|| {
            StategateError::Server(ServerError::StartupFailed {
                details: "State controller is required".to_string(),
            })
        })?;

        let probe = self.probe.ok_or_else(|| {
            StategateError::Server(ServerError::StartupFailed {
                details: "System probe is required".to_string(),
            })
        })?;

        Ok(ControlServer::new(config, controller, probe))
    }
}

impl Default for ControlServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
