use super::types::{ComponentState, ShutdownReason};
use crate::audit::TransitionJournal;
use crate::config::StategateConfig;
use crate::controller::StateController;
use crate::error::Result;
use crate::http::{ControlServer, ControlServerBuilder};
use crate::probe::HostProbe;
use crate::reaper::{CliRuntime, ContainerReaper, ContainerRuntime, DisabledRuntime};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub(super) type ShutdownSender = Arc<Mutex<Option<oneshot::Sender<ShutdownReason>>>>;

/// Wires the controller, reaper, probe and HTTP server together and owns their lifecycle
pub struct StategateApp {
    pub(super) config: StategateConfig,
    pub(super) controller: Arc<StateController>,
    pub(super) server: Arc<ControlServer>,
    pub(super) server_task: Option<JoinHandle<Result<()>>>,
    pub(super) local_addr: Option<SocketAddr>,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<String, ComponentState>>>,
    pub(super) shutdown_sender: ShutdownSender,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl StategateApp {
    /// Create a new application with the given configuration
    pub async fn new(config: StategateConfig) -> Result<Self> {
        let runtime: Arc<dyn ContainerRuntime> = if config.reaper.enabled {
            info!("Container reaping enabled via '{}'", config.reaper.command);
            Arc::new(CliRuntime::new(config.reaper.command.clone()))
        } else {
            info!("Container reaping disabled");
            Arc::new(DisabledRuntime)
        };

        let reaper = ContainerReaper::new(
            runtime,
            config.reaper.list_timeout(),
            config.reaper.stop_timeout(),
        );

        let mut controller = StateController::new(reaper);
        if config.journal.enabled {
            let journal = TransitionJournal::open(&config.journal.path).await?;
            controller = controller.with_journal(journal);
        }
        let controller = Arc::new(controller);

        let probe = Arc::new(HostProbe::new(
            config.service.name.clone(),
            config.probe.disk_mount.clone(),
        ));

        let server = ControlServerBuilder::new()
            .config(config.server.clone())
            .controller(Arc::clone(&controller))
            .probe(probe)
            .build()?;

        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        Ok(Self {
            config,
            controller,
            server: Arc::new(server),
            server_task: None,
            local_addr: None,
            component_states: Arc::new(Mutex::new(HashMap::new())),
            shutdown_sender: Arc::new(Mutex::new(Some(shutdown_sender))),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// The state controller shared with the HTTP layer
    pub fn controller(&self) -> Arc<StateController> {
        Arc::clone(&self.controller)
    }

    /// Address the server is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}
