//! Dispatch error types.

use domain::HandlerError;
use outbox::OutboxError;
use thiserror::Error;

/// One handler's failure within a delivery.
#[derive(Debug)]
pub struct HandlerFailure {
    handler: String,
    error: HandlerError,
}

impl HandlerFailure {
    pub fn new(handler: impl Into<String>, error: HandlerError) -> Self {
        Self {
            handler: handler.into(),
            error,
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn error(&self) -> &HandlerError {
        &self.error
    }

    /// Renders the failure with its full source chain, for the outbox
    /// `error` column.
    fn render(&self) -> String {
        let mut text = format!("{}: {}", self.handler, self.error);
        let mut source = std::error::Error::source(&self.error);
        while let Some(err) = source {
            text.push_str(&format!(" (caused by: {err})"));
            source = err.source();
        }
        text
    }
}

impl std::fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Collected handler failures of one delivery, zero, one, or many.
///
/// Every handler of a delivery runs even when an earlier one fails; their
/// failures are gathered here and surfaced together once all have run.
/// Callers inspect [`count`](Self::count) rather than distinguishing a
/// single failure from an aggregate.
#[derive(Debug, Default, Error)]
pub struct HandlerFailures {
    failures: Vec<HandlerFailure>,
}

impl HandlerFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: HandlerFailure) {
        self.failures.push(failure);
    }

    pub fn count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandlerFailure> {
        self.failures.iter()
    }
}

impl std::fmt::Display for HandlerFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.failures.as_slice() {
            [] => write!(f, "no handler failures"),
            [single] => write!(f, "{single}"),
            many => {
                write!(f, "{} handlers failed: ", many.len())?;
                for (i, failure) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{failure}")?;
                }
                Ok(())
            }
        }
    }
}

/// Errors that can occur during dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for the event's type tag. A delivery
    /// without a consumer is a failure, not a silent success.
    #[error("No handler found for event {event_name}")]
    NoHandlers { event_name: String },

    /// One or more handlers failed during a delivery.
    #[error("Handler execution failed: {0}")]
    Handlers(#[from] HandlerFailures),

    /// The dispatch queue is closed; the worker has stopped.
    #[error("Dispatch queue is closed")]
    QueueClosed,

    /// An error occurred on the outbox.
    #[error("Outbox error: {0}")]
    Outbox(#[from] OutboxError),
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(handler: &str, message: &str) -> HandlerFailure {
        HandlerFailure::new(handler, HandlerError::msg(message))
    }

    #[test]
    fn single_failure_renders_as_itself() {
        let mut failures = HandlerFailures::new();
        failures.push(failure("cache-refresh", "cache offline"));

        assert_eq!(failures.count(), 1);
        assert_eq!(failures.to_string(), "cache-refresh: cache offline");
    }

    #[test]
    fn multiple_failures_render_as_aggregate() {
        let mut failures = HandlerFailures::new();
        failures.push(failure("a", "first"));
        failures.push(failure("b", "second"));

        let text = failures.to_string();
        assert!(text.starts_with("2 handlers failed"));
        assert!(text.contains("a: first"));
        assert!(text.contains("b: second"));
    }

    #[test]
    fn failure_render_includes_source_chain() {
        let io = std::io::Error::other("connection reset");
        let failure = HandlerFailure::new("publisher", HandlerError::with_source("send failed", io));

        let text = failure.to_string();
        assert!(text.contains("publisher: send failed"));
        assert!(text.contains("caused by: connection reset"));
    }
}
