//! Event dispatch engine: the two-phase hand-off between persistence and
//! delivery.
//!
//! `pre_dispatch` runs inside the save that persists a business change and
//! writes the durable outbox row; `post_dispatch` runs after the commit.
//! The async engine enqueues onto an unbounded channel consumed by a single
//! background worker that resolves handlers, runs them in priority order,
//! and walks the outbox state machine. The sync engine runs handlers inline
//! on the caller, trading durability for latency.
//!
//! The [`UnitOfWork`] commit hook glues the phases to saves and explicit
//! transactions: events raised inside an explicit transaction are buffered
//! per transaction and only dispatched once it commits.

pub mod async_dispatcher;
pub mod config;
mod delivery;
pub mod dispatcher;
pub mod error;
pub mod sync_dispatcher;
pub mod unit_of_work;

pub use async_dispatcher::AsyncDispatcher;
pub use config::{DispatchConfig, DispatchMode, build_dispatcher};
pub use dispatcher::EventDispatcher;
pub use error::{DispatchError, HandlerFailure, HandlerFailures, Result};
pub use sync_dispatcher::SyncDispatcher;
pub use unit_of_work::UnitOfWork;
