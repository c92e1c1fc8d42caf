use crate::audit::{AuditLog, TransitionJournal, TransitionRecord};
use crate::error::{Result, StategateError};
use crate::reaper::{ContainerReaper, ReapReport};
use crate::state::State;
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Result of a transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Unchanged,
    Changed { from: State, to: State },
}

struct ControllerInner {
    state: State,
    audit_log: AuditLog,
    journal: Option<TransitionJournal>,
}

struct Shared {
    inner: Mutex<ControllerInner>,
    reaper: ContainerReaper,
    last_cleanup: SyncMutex<Option<ReapReport>>,
}

/// Owns the lifecycle state and applies transitions.
///
/// State, audit log and journal share one lock so that reading the current state,
/// deciding and writing the new one happen as a unit. The reaper runs after the lock
/// is released. Transitions and reap passes run on their own task and complete even
/// when the caller is dropped.
pub struct StateController {
    shared: Arc<Shared>,
}

impl StateController {
    /// Create a controller in `INIT` with an empty audit log and no journal
    pub fn new(reaper: ContainerReaper) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(ControllerInner {
                    state: State::Init,
                    audit_log: AuditLog::new(),
                    journal: None,
                }),
                reaper,
                last_cleanup: SyncMutex::new(None),
            }),
        }
    }

    /// Also append every accepted transition to `journal`
    pub fn with_journal(mut self, journal: TransitionJournal) -> Self {
        match Arc::get_mut(&mut self.shared) {
            Some(shared) => shared.inner.get_mut().journal = Some(journal),
            None => warn!(
                "Controller already in use, journal {} not attached",
                journal.path().display()
            ),
        }
        self
    }

    pub async fn current_state(&self) -> State {
        self.shared.inner.lock().await.state
    }

    /// Parse `name` and transition to it
    pub async fn transition_named(&self, name: &str) -> Result<TransitionOutcome> {
        let requested: State = name.parse()?;
        self.transition(requested).await
    }

    /// Move to `requested`.
    ///
    /// A no-op request has no side effects. Entering `INIT` clears the audit log after
    /// recording the transition. Entering `SHUTDOWN` stops all managed containers before
    /// returning; cleanup failures are logged and never fail the transition.
    ///
    /// Only fails if the transition task itself is torn down.
    pub async fn transition(&self, requested: State) -> Result<TransitionOutcome> {
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move { shared.apply(requested).await })
            .await
            .map_err(|e| {
                error!("Transition to {} aborted: {}", requested, e);
                StategateError::system(format!("Transition to {} aborted: {}", requested, e))
            })
    }

    /// Run a reap pass without touching the lifecycle state
    pub async fn reap_now(&self) -> Result<ReapReport> {
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            let report = shared.reaper.stop_all().await;
            shared.record_cleanup(report.clone());
            report
        })
        .await
        .map_err(|e| {
            error!("Reap pass aborted: {}", e);
            StategateError::system(format!("Reap pass aborted: {}", e))
        })
    }

    pub async fn audit_snapshot(&self) -> Vec<TransitionRecord> {
        self.shared.inner.lock().await.audit_log.snapshot()
    }

    pub async fn audit_len(&self) -> usize {
        self.shared.inner.lock().await.audit_log.len()
    }

    /// Audit log rendered for `/run-log`
    pub async fn render_audit_log(&self) -> String {
        self.shared.inner.lock().await.audit_log.render()
    }

    /// Report of the most recent reap pass, if any ran
    pub fn last_cleanup(&self) -> Option<ReapReport> {
        self.shared.last_cleanup.lock().clone()
    }
}

impl Shared {
    async fn apply(&self, requested: State) -> TransitionOutcome {
        let record = {
            let mut inner = self.inner.lock().await;
            let from = inner.state;

            if from == requested {
                debug!("State already {}, nothing to do", requested);
                return TransitionOutcome::Unchanged;
            }

            inner.state = requested;
            let record = TransitionRecord::new(from, requested);
            inner.audit_log.append(record.clone());

            if requested == State::Init {
                inner.audit_log.clear();
                debug!("Audit log cleared on entering INIT");
            }

            if let Some(journal) = inner.journal.as_mut() {
                if let Err(e) = journal.append(&record).await {
                    error!(
                        "Failed to journal transition {}->{} to {}: {}",
                        from,
                        requested,
                        journal.path().display(),
                        e
                    );
                }
            }

            record
        };

        info!("State changed: {} -> {}", record.from, record.to);

        if record.to == State::Shutdown {
            let report = self.reaper.stop_all().await;
            if !report.is_clean() {
                warn!(
                    "Shutdown cleanup finished with {} failure(s)",
                    report.errors.len()
                );
            }
            self.record_cleanup(report);
        }

        TransitionOutcome::Changed {
            from: record.from,
            to: record.to,
        }
    }

    fn record_cleanup(&self, report: ReapReport) {
        *self.last_cleanup.lock() = Some(report);
    }
}
