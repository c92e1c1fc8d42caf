use super::{ComponentState, ShutdownReason, StategateApp};
use crate::error::Result;
use crate::http::local_addr;
use std::sync::Arc;
use tracing::{error, info};

impl StategateApp {
    /// Bind the HTTP listener and serve in the background
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting Stategate");

        self.set_component_state("server", ComponentState::Starting)
            .await;

        let listener = match self.server.bind().await {
            Ok(listener) => listener,
            Err(e) => {
                self.set_component_state("server", ComponentState::Failed)
                    .await;
                error!("Failed to start control server: {}", e);
                return Err(e);
            }
        };
        let bound = local_addr(&listener)?;
        self.local_addr = Some(bound);

        let server = Arc::clone(&self.server);
        let token = self.cancellation_token.clone();
        let shutdown_sender = Arc::clone(&self.shutdown_sender);

        self.server_task = Some(tokio::spawn(async move {
            let result = server.serve(listener, token).await;
            if let Err(e) = &result {
                error!("Control server error: {}", e);
                if let Some(sender) = shutdown_sender.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Error(e.to_string()));
                }
            }
            result
        }));

        self.set_component_state("server", ComponentState::Running)
            .await;
        info!(
            "Stategate started on {} in state {}",
            bound,
            self.controller.current_state().await
        );

        Ok(())
    }
}
