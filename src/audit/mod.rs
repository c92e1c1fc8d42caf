mod journal;
mod log;

pub use journal::TransitionJournal;
pub use log::{AuditLog, TransitionRecord};
