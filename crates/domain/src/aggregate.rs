//! Aggregate root contract: accumulating and draining pending events.

use crate::event::EventRecord;

/// Insertion-ordered list of events an aggregate has raised but not yet
/// committed. Owned exclusively by the aggregate; nothing else mutates it.
#[derive(Debug, Default)]
pub struct PendingEvents {
    events: Vec<EventRecord>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured event, preserving insertion order.
    pub fn push(&mut self, record: EventRecord) {
        self.events.push(record);
    }

    pub fn as_slice(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn as_mut_slice(&mut self) -> &mut [EventRecord] {
        &mut self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Empties the list. This is the only way events leave it.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Trait for aggregate roots that raise domain events.
///
/// Implementors embed a [`PendingEvents`] field and expose it through the
/// two accessor methods; the provided methods give the standard
/// add/read/clear surface.
///
/// Reading events does not drain the list: the commit hook reads the
/// pending events and then explicitly calls [`clear_domain_events`].
/// Without the clear, the same events would be captured again on the
/// next save.
///
/// [`clear_domain_events`]: AggregateRoot::clear_domain_events
pub trait AggregateRoot: Send {
    /// The aggregate's unique id, used as the event correlation key.
    fn id(&self) -> &str;

    fn pending_events(&self) -> &PendingEvents;

    fn pending_events_mut(&mut self) -> &mut PendingEvents;

    /// Appends a captured event to the pending list.
    fn add_domain_event(&mut self, record: EventRecord) {
        self.pending_events_mut().push(record);
    }

    /// Read-only view of the pending events, in insertion order.
    fn domain_events(&self) -> &[EventRecord] {
        self.pending_events().as_slice()
    }

    /// Empties the pending list.
    fn clear_domain_events(&mut self) {
        self.pending_events_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DomainEvent;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Bumped {
        value: i32,
    }

    impl DomainEvent for Bumped {
        fn event_name(&self) -> &'static str {
            "Bumped"
        }
    }

    struct Counter {
        id: String,
        value: i32,
        pending: PendingEvents,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                id: "counter-1".to_string(),
                value: 0,
                pending: PendingEvents::new(),
            }
        }

        fn bump(&mut self) {
            self.value += 1;
            let record = EventRecord::capture(&Bumped { value: self.value }).unwrap();
            self.add_domain_event(record);
        }
    }

    impl AggregateRoot for Counter {
        fn id(&self) -> &str {
            &self.id
        }

        fn pending_events(&self) -> &PendingEvents {
            &self.pending
        }

        fn pending_events_mut(&mut self) -> &mut PendingEvents {
            &mut self.pending
        }
    }

    #[test]
    fn events_accumulate_in_insertion_order() {
        let mut counter = Counter::new();
        counter.bump();
        counter.bump();
        counter.bump();

        let events = counter.domain_events();
        assert_eq!(events.len(), 3);
        let values: Vec<i32> = events
            .iter()
            .map(|e| e.decode::<Bumped>().unwrap().value)
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn reading_does_not_drain() {
        let mut counter = Counter::new();
        counter.bump();

        assert_eq!(counter.domain_events().len(), 1);
        assert_eq!(counter.domain_events().len(), 1);

        counter.clear_domain_events();
        assert!(counter.domain_events().is_empty());
    }
}
