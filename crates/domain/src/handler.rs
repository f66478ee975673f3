//! Event handler contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::container::HandlerContainer;
use crate::event::EventRecord;

/// Error returned by a handler execution.
///
/// Handlers wrap whatever went wrong into a message plus an optional
/// source; the dispatcher records the rendered text on the outbox row.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source("event payload decode failed", err)
    }
}

/// Trait for domain event handlers.
///
/// A handler declares the event tag it consumes and a priority. All
/// handlers registered for an event's tag run for every delivery of that
/// event, sequentially, highest priority first; handlers with equal
/// priority run in registration order. The shared [`HandlerContainer`]
/// lets an earlier handler pass data to a later one.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// The handler's own name, used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// The event tag this handler consumes, matching
    /// [`DomainEvent::event_name`](crate::DomainEvent::event_name).
    fn event_name(&self) -> &str;

    /// Execution priority within one delivery, higher first.
    fn priority(&self) -> i16 {
        0
    }

    /// Handles one delivery of an event.
    async fn handle(
        &self,
        record: &EventRecord,
        container: &mut HandlerContainer,
    ) -> Result<(), HandlerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_renders_message() {
        let err = HandlerError::msg("downstream unavailable");
        assert_eq!(err.to_string(), "downstream unavailable");
    }

    #[test]
    fn handler_error_keeps_source() {
        let io = std::io::Error::other("boom");
        let err = HandlerError::with_source("publish failed", io);
        assert_eq!(err.to_string(), "publish failed");
        assert!(std::error::Error::source(&err).is_some());
    }
}
