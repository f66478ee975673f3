//! Durable outbox for domain events.
//!
//! Every captured domain event gets one row here, written in the same
//! transaction as the business change that raised it. The row then walks a
//! delivery state machine: `Pending` at capture, `InProgress` when the
//! dispatch worker picks it up, and terminal `Published` on success or
//! `InError` on failure. `InError` rows may be re-driven externally;
//! `Published` rows are immutable.

pub mod error;
pub mod log;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{OutboxError, Result};
pub use log::{EventLogState, IntegrationEventLog};
pub use memory::InMemoryOutboxStore;
pub use postgres::PostgresOutboxStore;
pub use store::{OutboxStore, TransactionToken};
