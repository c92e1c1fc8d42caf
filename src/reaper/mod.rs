mod mock;
mod runtime;
mod sweep;

pub use mock::MockRuntime;
pub use runtime::{CliRuntime, ContainerHandle, ContainerRuntime, DisabledRuntime};
pub use sweep::{ContainerReaper, ReapFailure, ReapReport};
