//! Outbox error types.

use common::EventId;
use thiserror::Error;

use crate::log::EventLogState;
use crate::store::TransactionToken;

/// Errors that can occur on the outbox.
#[derive(Debug, Error)]
pub enum OutboxError {
    /// A state transition was attempted on a row that already reached
    /// `Published`. The event was durably delivered; mutating it further
    /// is a bug in the caller, so this is never retried or ignored.
    #[error("Event log {id} is already published and cannot move to {attempted}")]
    StateConflict {
        id: EventId,
        attempted: EventLogState,
    },

    /// An insert hit the primary key: a row for this event id already
    /// exists. A retried capture must be a no-op or an error, never a
    /// second row.
    #[error("Event log {0} already exists")]
    DuplicateEvent(EventId),

    /// The addressed row does not exist.
    #[error("Event log not found: {0}")]
    NotFound(EventId),

    /// The given explicit transaction is not open on this store.
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(TransactionToken),

    /// A persisted state column held a value outside the state machine.
    #[error("Unknown event log state {value} on row {id}")]
    UnknownState { id: EventId, value: i32 },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for outbox operations.
pub type Result<T> = std::result::Result<T, OutboxError>;
