use super::runtime::{ContainerHandle, ContainerRuntime};
use crate::error::ReaperError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// A failure captured during a reap pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReapFailure {
    /// `None` when enumeration itself failed
    pub container: Option<ContainerHandle>,
    pub cause: String,
}

/// Outcome of one best-effort reap pass
#[derive(Debug, Clone, Serialize)]
pub struct ReapReport {
    pub attempted: usize,
    pub stopped: Vec<ContainerHandle>,
    pub errors: Vec<ReapFailure>,
    pub completed_at: DateTime<Utc>,
}

impl ReapReport {
    fn empty() -> Self {
        Self {
            attempted: 0,
            stopped: Vec::new(),
            errors: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    pub fn stopped_count(&self) -> usize {
        self.stopped.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Stops every running managed container, one at a time, continuing past failures
pub struct ContainerReaper {
    runtime: Arc<dyn ContainerRuntime>,
    list_timeout: Duration,
    stop_timeout: Duration,
}

impl ContainerReaper {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        list_timeout: Duration,
        stop_timeout: Duration,
    ) -> Self {
        Self {
            runtime,
            list_timeout,
            stop_timeout,
        }
    }

    /// Enumerate running containers and stop each of them.
    ///
    /// Never fails: enumeration errors, per-container errors, timeouts and panics in
    /// the runtime all end up in the report's `errors`.
    pub async fn stop_all(&self) -> ReapReport {
        let mut report = ReapReport::empty();

        let handles = match self.list_running().await {
            Ok(handles) => handles,
            Err(e) => {
                error!("Container enumeration via {} failed: {}", self.runtime.name(), e);
                report.errors.push(ReapFailure {
                    container: None,
                    cause: e.to_string(),
                });
                report.completed_at = Utc::now();
                return report;
            }
        };

        if handles.is_empty() {
            info!("No running containers to stop");
            return report;
        }

        info!("Stopping {} running container(s)", handles.len());

        for handle in handles {
            report.attempted += 1;
            match self.stop_one(handle.clone()).await {
                Ok(()) => {
                    info!("Stopped container {}", handle);
                    report.stopped.push(handle);
                }
                Err(e) => {
                    warn!("Could not stop container {}: {}", handle, e);
                    report.errors.push(ReapFailure {
                        container: Some(handle),
                        cause: e.to_string(),
                    });
                }
            }
        }

        report.completed_at = Utc::now();

        if report.is_clean() {
            info!("Stopped all {} container(s)", report.stopped_count());
        } else {
            warn!(
                "Stopped {} of {} container(s), {} failure(s)",
                report.stopped_count(),
                report.attempted,
                report.errors.len()
            );
        }

        report
    }

    async fn list_running(&self) -> Result<Vec<ContainerHandle>, ReaperError> {
        let runtime = Arc::clone(&self.runtime);
        let list_timeout = self.list_timeout;

        let task =
            tokio::spawn(async move { timeout(list_timeout, runtime.list_running()).await });

        match task.await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ReaperError::Timeout {
                operation: "Container enumeration".to_string(),
                after: list_timeout,
            }),
            Err(e) => Err(ReaperError::Aborted {
                details: e.to_string(),
            }),
        }
    }

    async fn stop_one(&self, handle: ContainerHandle) -> Result<(), ReaperError> {
        let runtime = Arc::clone(&self.runtime);
        let stop_timeout = self.stop_timeout;
        let id = handle.id().to_string();

        let task = tokio::spawn(async move { timeout(stop_timeout, runtime.stop(&handle)).await });

        match task.await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ReaperError::Timeout {
                operation: format!("Stopping container {}", id),
                after: stop_timeout,
            }),
            Err(e) => Err(ReaperError::Aborted {
                details: e.to_string(),
            }),
        }
    }
}
