use crate::error::{Result, StategateError};
use crate::state::State;

/// Whether a gated request may proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Rejected { status: u16, reason: &'static str },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }

    /// Turn a rejection into `StategateError::GateRejected`
    pub fn into_result(self) -> Result<()> {
        match self {
            GateDecision::Allowed => Ok(()),
            GateDecision::Rejected { status, reason } => {
                Err(StategateError::GateRejected { status, reason })
            }
        }
    }
}

/// Gating policies for the endpoints that depend on the lifecycle state.
///
/// The two policies disagree about INIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Only RUNNING serves; used by the service-info endpoint
    Strict,
    /// Serves unless PAUSED or SHUTDOWN; used by the request probe
    Lenient,
}

impl GatePolicy {
    pub fn evaluate(self, state: State) -> GateDecision {
        match (self, state) {
            (GatePolicy::Strict, State::Running) => GateDecision::Allowed,
            (GatePolicy::Strict, State::Paused) => GateDecision::Rejected {
                status: 503,
                reason: "Service unavailable",
            },
            (GatePolicy::Strict, State::Init) => GateDecision::Rejected {
                status: 403,
                reason: "Service not initialized",
            },
            (GatePolicy::Strict, State::Shutdown) => GateDecision::Rejected {
                status: 503,
                reason: "Service has been shut down",
            },
            (GatePolicy::Lenient, State::Paused | State::Shutdown) => GateDecision::Rejected {
                status: 503,
                reason: "Service unavailable",
            },
            (GatePolicy::Lenient, State::Init | State::Running) => GateDecision::Allowed,
        }
    }
}
