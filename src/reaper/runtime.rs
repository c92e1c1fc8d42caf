use crate::error::ReaperError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tokio::process::Command;
use tracing::debug;

/// Identifier of a running managed container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability the reaper needs from a container engine
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Enumerate the containers running right now
    async fn list_running(&self) -> Result<Vec<ContainerHandle>, ReaperError>;

    /// Stop a single container
    async fn stop(&self, handle: &ContainerHandle) -> Result<(), ReaperError>;
}

/// Drives a docker-compatible CLI (`<command> ps -q`, `<command> stop <id>`)
pub struct CliRuntime {
    command: String,
}

impl CliRuntime {
    pub fn new<S: Into<String>>(command: S) -> Self {
        Self {
            command: command.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, ReaperError> {
        debug!("Running {} {}", self.command, args.join(" "));

        Command::new(&self.command)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ReaperError::Spawn {
                command: self.command.clone(),
                source: e,
            })
    }
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    fn name(&self) -> &str {
        &self.command
    }

    async fn list_running(&self) -> Result<Vec<ContainerHandle>, ReaperError> {
        let output = self.run(&["ps", "-q"]).await?;

        if !output.status.success() {
            return Err(ReaperError::ListFailed {
                details: failure_details(&output),
            });
        }

        Ok(parse_container_ids(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), ReaperError> {
        let output = self.run(&["stop", handle.id()]).await?;

        if !output.status.success() {
            return Err(ReaperError::StopFailed {
                id: handle.id().to_string(),
                details: failure_details(&output),
            });
        }

        Ok(())
    }
}

/// Runtime used when reaping is switched off: never sees any containers
pub struct DisabledRuntime;

#[async_trait]
impl ContainerRuntime for DisabledRuntime {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn list_running(&self) -> Result<Vec<ContainerHandle>, ReaperError> {
        Ok(Vec::new())
    }

    async fn stop(&self, _handle: &ContainerHandle) -> Result<(), ReaperError> {
        Ok(())
    }
}

/// One id per non-blank line of `ps -q` output
pub(crate) fn parse_container_ids(stdout: &str) -> Vec<ContainerHandle> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ContainerHandle::new)
        .collect()
}

fn failure_details(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}
