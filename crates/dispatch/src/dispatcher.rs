//! The two-phase dispatcher contract.

use async_trait::async_trait;
use domain::EventRecord;
use outbox::TransactionToken;

use crate::Result;

/// Two-phase hand-off between the persistence layer and event delivery.
///
/// The phases are asymmetric. `pre_dispatch` runs before the enclosing
/// save commits and makes the event durable; `post_dispatch` runs after
/// the commit and moves the event toward its handlers. No handler ever
/// runs in `pre_dispatch`.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// Called once per pending event while the enclosing save is still
    /// open. Writes the outbox row on the caller's transaction (when a
    /// token is given), so event durability and business durability are
    /// atomic. A failure here propagates and aborts the save.
    async fn pre_dispatch(&self, event: &EventRecord, token: Option<TransactionToken>)
        -> Result<()>;

    /// Called after the enclosing save committed. The async engine only
    /// enqueues the event and returns; the sync engine executes handlers
    /// inline and surfaces their failures to the caller.
    async fn post_dispatch(&self, event: EventRecord) -> Result<()>;
}
