//! Governance aggregates and their change events.
//!
//! A compact slice of the governance domain (document types and workflow
//! phases) used to exercise the outbox engine end to end. CRUD surfaces,
//! caching, and transport adapters live outside this crate.

mod doc_type;
mod events;
mod phase;

pub use doc_type::DocType;
pub use events::{ChangeKind, DocTypeChanged, PhaseChanged};
pub use phase::PhaseDefinition;

use thiserror::Error;

/// Errors raised by governance aggregate operations.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// A required code was empty.
    #[error("Code is required")]
    CodeRequired,

    /// A required display name was empty.
    #[error("Name is required")]
    NameRequired,

    /// The default phase is not in the allowed phase list.
    #[error("Default phase {default_phase:?} is not among the allowed phases")]
    DefaultPhaseNotAllowed { default_phase: String },

    /// An event payload could not be serialized at capture time.
    #[error("Event capture failed: {0}")]
    Capture(#[from] serde_json::Error),
}
