use super::runtime::{ContainerHandle, ContainerRuntime};
use crate::error::ReaperError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// In-memory container runtime for testing without a container engine
#[derive(Default)]
pub struct MockRuntime {
    running: Mutex<Vec<ContainerHandle>>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    panicking: HashSet<String>,
    list_error: Option<String>,
    list_calls: Mutex<usize>,
    stop_calls: Mutex<Vec<ContainerHandle>>,
}

impl MockRuntime {
    /// Create a mock with the given containers running
    pub fn with_containers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            running: Mutex::new(ids.into_iter().map(ContainerHandle::new).collect()),
            ..Default::default()
        }
    }

    /// Stopping `id` returns an error
    pub fn fail_on(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Stopping `id` never completes
    pub fn hang_on(mut self, id: &str) -> Self {
        self.hanging.insert(id.to_string());
        self
    }

    /// Stopping `id` panics
    pub fn panic_on(mut self, id: &str) -> Self {
        self.panicking.insert(id.to_string());
        self
    }

    /// Enumeration fails with `details`
    pub fn fail_listing(mut self, details: &str) -> Self {
        self.list_error = Some(details.to_string());
        self
    }

    /// Containers that are still running
    pub fn running(&self) -> Vec<ContainerHandle> {
        self.running.lock().clone()
    }

    /// Every stop request received, in order
    pub fn stop_calls(&self) -> Vec<ContainerHandle> {
        self.stop_calls.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock()
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_running(&self) -> Result<Vec<ContainerHandle>, ReaperError> {
        *self.list_calls.lock() += 1;

        if let Some(details) = &self.list_error {
            return Err(ReaperError::ListFailed {
                details: details.clone(),
            });
        }

        Ok(self.running.lock().clone())
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), ReaperError> {
        self.stop_calls.lock().push(handle.clone());
        debug!("Mock stop requested for {}", handle);

        if self.panicking.contains(handle.id()) {
            panic!("mock runtime panicked stopping {}", handle);
        }

        if self.hanging.contains(handle.id()) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        if self.failing.contains(handle.id()) {
            return Err(ReaperError::StopFailed {
                id: handle.id().to_string(),
                details: "mock failure".to_string(),
            });
        }

        self.running.lock().retain(|running| running != handle);
        Ok(())
    }
}
