//! Async submission flow: one in-flight submission per operation, keyed
//! switch previews and the expired-subscription fallback.

pub mod guard;
pub mod orchestrator;

pub use guard::{SubmissionGuard, SubmissionKind, SubmissionTicket};
pub use orchestrator::{CabinetFlow, CatalogSnapshot, Submission, SwitchOutcome};
