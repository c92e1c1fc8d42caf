use super::{ComponentState, StategateApp};
use crate::error::{Result, StategateError};
use tokio::time::timeout;
use tracing::{error, info};

impl StategateApp {
    /// Stop accepting requests and wait for the server to drain.
    ///
    /// The lifecycle state is left as is; it is not persisted.
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");

        self.cancellation_token.cancel();

        let mut exit_code = 0;

        if let Err(e) = self.stop_server().await {
            error!("Error stopping server: {}", e);
            exit_code = 1;
        }

        info!(
            "Graceful shutdown completed in state {} with exit code: {} ({})",
            self.controller.current_state().await,
            exit_code,
            self.component_summary().await
        );
        Ok(exit_code)
    }

    async fn stop_server(&mut self) -> Result<()> {
        let component = "server";
        info!("Stopping {} component", component);
        self.set_component_state(component, ComponentState::Stopping)
            .await;

        let Some(server_task) = self.server_task.take() else {
            self.set_component_state(component, ComponentState::Stopped)
                .await;
            return Ok(());
        };

        let drain_timeout = self.config.server.shutdown_timeout();
        match timeout(drain_timeout, server_task).await {
            Ok(Ok(Ok(()))) => {
                self.set_component_state(component, ComponentState::Stopped)
                    .await;
                info!("{} component stopped", component);
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("Error stopping {} component: {}", component, e);
                Err(e)
            }
            Ok(Err(e)) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("{} component task failed: {}", component, e);
                Err(StategateError::system(format!(
                    "{} component task failed: {}",
                    component, e
                )))
            }
            Err(_) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("{} component stop timeout", component);
                Err(StategateError::system(format!(
                    "{} component stop timeout",
                    component
                )))
            }
        }
    }
}
