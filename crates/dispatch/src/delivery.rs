//! Shared handler execution for one delivery.

use domain::{EventRecord, HandlerContainer, HandlerRegistry};

use crate::error::{DispatchError, HandlerFailure, HandlerFailures};

/// Runs every handler registered for the event's tag, sequentially in
/// descending priority order, sharing one [`HandlerContainer`] across the
/// delivery.
///
/// Each handler's failure is caught and collected so the remaining
/// handlers still run; the collected failures surface together once all
/// handlers finished. No registered handler at all is a delivery failure.
pub(crate) async fn execute_handlers(
    registry: &HandlerRegistry,
    record: &EventRecord,
) -> Result<(), DispatchError> {
    let handlers = registry.handlers_for(record.event_name());
    if handlers.is_empty() {
        return Err(DispatchError::NoHandlers {
            event_name: record.event_name().to_string(),
        });
    }

    let mut container = HandlerContainer::new();
    let mut failures = HandlerFailures::new();
    for handler in handlers {
        if let Err(err) = handler.handle(record, &mut container).await {
            tracing::warn!(
                event_id = %record.id(),
                event_name = %record.event_name(),
                handler = handler.name(),
                error = %err,
                "handler failed"
            );
            failures.push(HandlerFailure::new(handler.name(), err));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain::{DomainEvent, EventHandler, HandlerError};
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Happened {}

    impl DomainEvent for Happened {
        fn event_name(&self) -> &'static str {
            "Happened"
        }
    }

    struct RelayHandler {
        name: &'static str,
        priority: i16,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventHandler for RelayHandler {
        fn name(&self) -> &'static str {
            self.name
        }

        fn event_name(&self) -> &str {
            "Happened"
        }

        fn priority(&self) -> i16 {
            self.priority
        }

        async fn handle(
            &self,
            _record: &EventRecord,
            container: &mut HandlerContainer,
        ) -> Result<(), HandlerError> {
            let order = self.calls.fetch_add(1, Ordering::SeqCst);
            container.set(self.name, order);
            if self.fail {
                return Err(HandlerError::msg(format!("{} failed", self.name)));
            }
            Ok(())
        }
    }

    fn registry_with(handlers: Vec<RelayHandler>) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        for handler in handlers {
            registry.register(Arc::new(handler));
        }
        registry
    }

    #[tokio::test]
    async fn no_handlers_is_a_delivery_failure() {
        let registry = HandlerRegistry::new();
        let record = EventRecord::capture(&Happened {}).unwrap();

        let result = execute_handlers(&registry, &record).await;
        assert!(matches!(result, Err(DispatchError::NoHandlers { .. })));
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_siblings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(vec![
            RelayHandler {
                name: "first",
                priority: 10,
                fail: true,
                calls: Arc::clone(&calls),
            },
            RelayHandler {
                name: "second",
                priority: 5,
                fail: false,
                calls: Arc::clone(&calls),
            },
        ]);
        let record = EventRecord::capture(&Happened {}).unwrap();

        let result = execute_handlers(&registry, &record).await;
        // Both handlers must have run.
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        match result {
            Err(DispatchError::Handlers(failures)) => {
                assert_eq!(failures.count(), 1);
                assert!(failures.to_string().contains("first failed"));
            }
            other => panic!("expected handler failures, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_failures_are_collected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(vec![
            RelayHandler {
                name: "a",
                priority: 0,
                fail: true,
                calls: Arc::clone(&calls),
            },
            RelayHandler {
                name: "b",
                priority: 0,
                fail: true,
                calls: Arc::clone(&calls),
            },
        ]);
        let record = EventRecord::capture(&Happened {}).unwrap();

        match execute_handlers(&registry, &record).await {
            Err(DispatchError::Handlers(failures)) => {
                assert_eq!(failures.count(), 2);
                let text = failures.to_string();
                assert!(text.contains("a failed"));
                assert!(text.contains("b failed"));
            }
            other => panic!("expected handler failures, got {other:?}"),
        }
    }
}
