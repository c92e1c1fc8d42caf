use thiserror::Error;

#[derive(Error, Debug)]
pub enum StategateError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Invalid state: {name}")]
    InvalidState { name: String },

    #[error("Unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    #[error("Request rejected ({status}): {reason}")]
    GateRejected { status: u16, reason: &'static str },

    #[error("Probe failure: {message}")]
    Probe { message: String },

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("System error: {message}")]
    System { message: String },
}

/// Failures raised while enumerating or stopping managed containers.
///
/// These never leave the reaper: they are collected into a report and logged.
#[derive(Error, Debug)]
pub enum ReaperError {
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list running containers: {details}")]
    ListFailed { details: String },

    #[error("Failed to stop container {id}: {details}")]
    StopFailed { id: String, details: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: std::time::Duration,
    },

    #[error("Reaper task aborted: {details}")]
    Aborted { details: String },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server startup failed: {details}")]
    StartupFailed { details: String },
}

impl StategateError {
    pub fn invalid_state<S: Into<String>>(name: S) -> Self {
        Self::InvalidState { name: name.into() }
    }

    pub fn probe<S: Into<String>>(message: S) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }

    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StategateError>;
