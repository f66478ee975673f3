//! Synchronous dispatcher: inline handler execution, no outbox.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{EventRecord, HandlerRegistry};
use outbox::TransactionToken;

use crate::delivery::execute_handlers;
use crate::dispatcher::EventDispatcher;
use crate::Result;

/// Dispatcher that runs handlers on the calling task, inside
/// `post_dispatch` itself.
///
/// There is no outbox write and therefore no durability: a crash between
/// commit and the end of `post_dispatch` loses the event. In exchange the
/// caller observes handler failures directly, and delivery adds no queue
/// latency. Selected by configuration, not by the events.
pub struct SyncDispatcher {
    registry: Arc<HandlerRegistry>,
}

impl SyncDispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl EventDispatcher for SyncDispatcher {
    async fn pre_dispatch(
        &self,
        _event: &EventRecord,
        _token: Option<TransactionToken>,
    ) -> Result<()> {
        Ok(())
    }

    /// Resolves and runs handlers inline; failures propagate to the
    /// caller of the save.
    async fn post_dispatch(&self, event: EventRecord) -> Result<()> {
        execute_handlers(&self.registry, &event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use async_trait::async_trait;
    use domain::{DomainEvent, EventHandler, HandlerContainer, HandlerError};
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Saved {}

    impl DomainEvent for Saved {
        fn event_name(&self) -> &'static str {
            "Saved"
        }
    }

    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn event_name(&self) -> &str {
            "Saved"
        }

        async fn handle(
            &self,
            _record: &EventRecord,
            _container: &mut HandlerContainer,
        ) -> std::result::Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn post_dispatch_runs_handlers_inline() {
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
        });
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::clone(&handler) as Arc<dyn EventHandler>);

        let dispatcher = SyncDispatcher::new(Arc::new(registry));
        let record = EventRecord::capture(&Saved {}).unwrap();

        dispatcher.post_dispatch(record).await.unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_handlers_propagate_to_caller() {
        let dispatcher = SyncDispatcher::new(Arc::new(HandlerRegistry::new()));
        let record = EventRecord::capture(&Saved {}).unwrap();

        let result = dispatcher.post_dispatch(record).await;
        assert!(matches!(result, Err(DispatchError::NoHandlers { .. })));
    }

    #[tokio::test]
    async fn pre_dispatch_is_a_no_op() {
        let dispatcher = SyncDispatcher::new(Arc::new(HandlerRegistry::new()));
        let record = EventRecord::capture(&Saved {}).unwrap();

        // No outbox, no durability step: pre-dispatch never fails.
        dispatcher.pre_dispatch(&record, None).await.unwrap();
    }
}
