use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StategateConfig {
    pub server: ServerConfig,
    pub service: ServiceConfig,
    pub reaper: ReaperConfig,
    pub journal: JournalConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind to
    #[serde(default = "default_server_ip")]
    pub ip: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// How long to wait for in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Name reported in the service-info payload
    #[serde(default = "default_service_name")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReaperConfig {
    /// Stop containers when entering SHUTDOWN
    #[serde(default = "default_reaper_enabled")]
    pub enabled: bool,

    /// Docker-compatible CLI used to list and stop containers
    #[serde(default = "default_reaper_command")]
    pub command: String,

    /// Upper bound for listing running containers
    #[serde(default = "default_list_timeout")]
    pub list_timeout_seconds: u64,

    /// Upper bound for stopping a single container
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JournalConfig {
    /// Persist transitions to a text file
    #[serde(default = "default_journal_enabled")]
    pub enabled: bool,

    /// Journal file path
    #[serde(default = "default_journal_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProbeConfig {
    /// Mount point whose free space is reported
    #[serde(default = "default_disk_mount")]
    pub disk_mount: String,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

impl ReaperConfig {
    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_seconds)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_seconds)
    }
}

impl StategateConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("stategate.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("server.ip", default_server_ip())?
            .set_default("server.port", default_server_port())?
            .set_default(
                "server.shutdown_timeout_seconds",
                default_shutdown_timeout(),
            )?
            .set_default("service.name", default_service_name())?
            .set_default("reaper.enabled", default_reaper_enabled())?
            .set_default("reaper.command", default_reaper_command())?
            .set_default("reaper.list_timeout_seconds", default_list_timeout())?
            .set_default("reaper.stop_timeout_seconds", default_stop_timeout())?
            .set_default("journal.enabled", default_journal_enabled())?
            .set_default("journal.path", default_journal_path())?
            .set_default("probe.disk_mount", default_disk_mount())?
            .add_source(File::with_name(&path_str).required(false))
            // STATEGATE_SERVER__PORT=9000 overrides server.port
            .add_source(
                Environment::with_prefix("STATEGATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: StategateConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.server.shutdown_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Server shutdown_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.reaper.command.trim().is_empty() {
            return Err(ConfigError::Message(
                "Reaper command must not be empty".to_string(),
            ));
        }

        if self.reaper.list_timeout_seconds == 0 || self.reaper.stop_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Reaper timeouts must be greater than 0".to_string(),
            ));
        }

        if self.journal.enabled && self.journal.path.trim().is_empty() {
            return Err(ConfigError::Message(
                "Journal path must not be empty when the journal is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> crate::error::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for StategateConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                ip: default_server_ip(),
                port: default_server_port(),
                shutdown_timeout_seconds: default_shutdown_timeout(),
            },
            service: ServiceConfig {
                name: default_service_name(),
            },
            reaper: ReaperConfig {
                enabled: default_reaper_enabled(),
                command: default_reaper_command(),
                list_timeout_seconds: default_list_timeout(),
                stop_timeout_seconds: default_stop_timeout(),
            },
            journal: JournalConfig {
                enabled: default_journal_enabled(),
                path: default_journal_path(),
            },
            probe: ProbeConfig {
                disk_mount: default_disk_mount(),
            },
        }
    }
}

// Default value functions
fn default_server_ip() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    8197
}
fn default_shutdown_timeout() -> u64 {
    10
}

fn default_service_name() -> String {
    "stategate".to_string()
}

fn default_reaper_enabled() -> bool {
    true
}
fn default_reaper_command() -> String {
    "docker".to_string()
}
fn default_list_timeout() -> u64 {
    10
}
fn default_stop_timeout() -> u64 {
    30
}

fn default_journal_enabled() -> bool {
    true
}
fn default_journal_path() -> String {
    "run.log".to_string()
}

fn default_disk_mount() -> String {
    "/".to_string()
}
