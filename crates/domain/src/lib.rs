//! Domain layer for the outbox engine.
//!
//! This crate provides the building blocks business code interacts with:
//! - [`DomainEvent`] trait for events raised by aggregates
//! - [`EventRecord`] envelope that carries an event through capture and dispatch
//! - [`AggregateRoot`] contract for accumulating pending events
//! - [`EventHandler`] trait, [`HandlerRegistry`], and the per-delivery
//!   [`HandlerContainer`] scratch space
//! - A small governance domain (`DocType`, `PhaseDefinition`) exercising it all

pub mod aggregate;
pub mod container;
pub mod event;
pub mod governance;
pub mod handler;
pub mod registry;

pub use aggregate::{AggregateRoot, PendingEvents};
pub use container::HandlerContainer;
pub use event::{DomainEvent, EventRecord};
pub use governance::{
    ChangeKind, DocType, DocTypeChanged, GovernanceError, PhaseChanged, PhaseDefinition,
};
pub use handler::{EventHandler, HandlerError};
pub use registry::HandlerRegistry;
