use crate::error::StategateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle phase of the gated service.
///
/// The service always starts in `Init`; there is no persistence across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    #[default]
    Init,
    Paused,
    Running,
    Shutdown,
}

impl State {
    pub const ALL: [State; 4] = [State::Init, State::Paused, State::Running, State::Shutdown];

    /// Wire name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Init => "INIT",
            State::Paused => "PAUSED",
            State::Running => "RUNNING",
            State::Shutdown => "SHUTDOWN",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = StategateError;

    /// Names are matched exactly after trimming surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "INIT" => Ok(State::Init),
            "PAUSED" => Ok(State::Paused),
            "RUNNING" => Ok(State::Running),
            "SHUTDOWN" => Ok(State::Shutdown),
            other => Err(StategateError::invalid_state(other)),
        }
    }
}
