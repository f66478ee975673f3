//! Outbox store contract and explicit-transaction tokens.

use async_trait::async_trait;
use common::EventId;
use uuid::Uuid;

use crate::log::IntegrationEventLog;
use crate::Result;

/// Stable identity of an explicit multi-statement transaction opened on an
/// [`OutboxStore`]. The commit hook keys its per-transaction event buffers
/// by this token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionToken(Uuid);

impl TransactionToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TransactionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistence surface for outbox rows.
///
/// Inserts may join an open explicit transaction by token, so that the
/// outbox row and the business change it belongs to commit or roll back
/// together. Reads and updates each run in their own short scope; no lock
/// is held between them — the state machine's `Published` guard is the
/// correctness mechanism, not pessimistic locking.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Opens an explicit transaction and returns its stable token.
    async fn begin(&self) -> Result<TransactionToken>;

    /// Commits the transaction identified by `token`.
    async fn commit(&self, token: TransactionToken) -> Result<()>;

    /// Rolls back the transaction identified by `token`.
    async fn rollback(&self, token: TransactionToken) -> Result<()>;

    /// Inserts a row, joining the open transaction when a token is given.
    /// The primary key on the event id makes a retried insert fail with
    /// [`OutboxError::DuplicateEvent`](crate::OutboxError::DuplicateEvent)
    /// instead of producing a second row.
    async fn insert(
        &self,
        log: &IntegrationEventLog,
        token: Option<TransactionToken>,
    ) -> Result<()>;

    /// Looks up a row by event id.
    async fn find(&self, id: EventId) -> Result<Option<IntegrationEventLog>>;

    /// Persists the mutable delivery fields of an existing row.
    async fn update(&self, log: &IntegrationEventLog) -> Result<()>;

    /// Rows not yet `Published`, oldest first (`create_time`, then
    /// `sequence`). This is the query surface an external re-driver sweeps.
    async fn list_undelivered(&self, limit: i64) -> Result<Vec<IntegrationEventLog>>;
}
