pub mod app;
pub mod audit;
pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod http;
pub mod probe;
pub mod reaper;
pub mod state;

pub use app::{ComponentState, ShutdownReason, StategateApp};
pub use audit::{AuditLog, TransitionJournal, TransitionRecord};
pub use config::StategateConfig;
pub use controller::{StateController, TransitionOutcome};
pub use error::{ReaperError, Result, ServerError, StategateError};
pub use gate::{GateDecision, GatePolicy};
pub use http::{router, ControlServer, ControlServerBuilder};
pub use probe::{HostProbe, ProcessEntry, SystemInfo, SystemProbe};
pub use reaper::{
    CliRuntime, ContainerHandle, ContainerReaper, ContainerRuntime, DisabledRuntime,
    MockRuntime, ReapFailure, ReapReport,
};
pub use state::State;
