//! Shared identifier types for the outbox engine.

pub mod types;

pub use types::EventId;
