use crate::error::{Result, StategateError};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use sysinfo::{Disks, ProcessesToUpdate, System};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

/// Host snapshot served by `/api`
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    #[serde(rename = "Service")]
    pub service: String,
    #[serde(rename = "IP Address")]
    pub ip_address: String,
    #[serde(rename = "Running Processes")]
    pub processes: Vec<ProcessEntry>,
    #[serde(rename = "Available Disk Space")]
    pub free_disk_bytes: u64,
    #[serde(rename = "Uptime (seconds)")]
    pub uptime_seconds: u64,
}

/// Read-only source of host information
#[async_trait]
pub trait SystemProbe: Send + Sync {
    async fn collect(&self) -> Result<SystemInfo>;
}

/// Probe backed by `sysinfo` and the host's primary IPv4 address
pub struct HostProbe {
    service_name: String,
    disk_mount: PathBuf,
}

impl HostProbe {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(service_name: S, disk_mount: P) -> Self {
        Self {
            service_name: service_name.into(),
            disk_mount: disk_mount.into(),
        }
    }
}

#[async_trait]
impl SystemProbe for HostProbe {
    async fn collect(&self) -> Result<SystemInfo> {
        let service = self.service_name.clone();
        let disk_mount = self.disk_mount.clone();

        tokio::task::spawn_blocking(move || collect_host_info(service, &disk_mount))
            .await
            .map_err(|e| StategateError::probe(format!("Probe task failed: {}", e)))?
    }
}

fn collect_host_info(service: String, disk_mount: &Path) -> Result<SystemInfo> {
    let ip_address = local_ip_address::local_ip()
        .map_err(|e| StategateError::probe(format!("Failed to resolve host IP: {}", e)))?
        .to_string();

    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    let mut processes: Vec<ProcessEntry> = system
        .processes()
        .iter()
        .map(|(pid, process)| ProcessEntry {
            pid: pid.as_u32(),
            name: process.name().to_string_lossy().into_owned(),
        })
        .collect();
    processes.sort_by_key(|entry| entry.pid);

    let disks = Disks::new_with_refreshed_list();
    let free_disk_bytes = disks
        .list()
        .iter()
        .filter(|disk| disk_mount.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
        .ok_or_else(|| {
            StategateError::probe(format!("No disk mounted at {}", disk_mount.display()))
        })?;

    let uptime_seconds = System::uptime();

    debug!(
        "Collected host info: {} processes, {} bytes free, up {}s",
        processes.len(),
        free_disk_bytes,
        uptime_seconds
    );

    Ok(SystemInfo {
        service,
        ip_address,
        processes,
        free_disk_bytes,
        uptime_seconds,
    })
}
