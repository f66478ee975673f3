//! Domain event trait and the capture envelope.

use chrono::{DateTime, Utc};
use common::EventId;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events are immutable facts raised by an aggregate, named in past
/// tense. They must serialize, because the outbox stores a snapshot of the
/// event taken at capture time.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync {
    /// Returns the short event type tag, e.g. `"DocTypeChanged"`.
    ///
    /// Handlers are registered against this tag.
    fn event_name(&self) -> &'static str;

    /// Returns the fully-qualified type name, used to pick the right type
    /// when an outbox row is deserialized later.
    fn event_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the correlation key this event concerns, usually the id of
    /// the aggregate that raised it.
    fn identifier(&self) -> Option<String> {
        None
    }
}

/// Envelope carrying a captured domain event through the engine.
///
/// A record is created once, when the event is added to an aggregate's
/// pending list, and is never mutated afterwards except for
/// `concurrent_sort`, which the commit hook assigns exactly once to break
/// ties among events captured at the same instant.
#[derive(Debug, Clone)]
pub struct EventRecord {
    id: EventId,
    event_name: String,
    event_type_name: String,
    identifier: Option<String>,
    create_time: DateTime<Utc>,
    concurrent_sort: i32,
    sort_assigned: bool,
    payload: serde_json::Value,
}

impl EventRecord {
    /// Captures a domain event into an envelope, serializing its payload.
    pub fn capture<E: DomainEvent>(event: &E) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: EventId::new(),
            event_name: event.event_name().to_string(),
            event_type_name: event.event_type_name().to_string(),
            identifier: event.identifier(),
            create_time: Utc::now(),
            concurrent_sort: 0,
            sort_assigned: false,
            payload: serde_json::to_value(event)?,
        })
    }

    /// Rebuilds the typed event from the captured payload snapshot.
    pub fn decode<E: DomainEvent>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn event_type_name(&self) -> &str {
        &self.event_type_name
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    /// Same-instant tie-break sequence, 0 until assigned.
    pub fn concurrent_sort(&self) -> i32 {
        self.concurrent_sort
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Assigns the tie-break sequence. Write-once: the first call wins and
    /// later calls are ignored. The commit hook calls this while collecting
    /// events for a save; business code never does.
    pub fn assign_sort(&mut self, sort: i32) {
        if !self.sort_assigned {
            self.concurrent_sort = sort;
            self.sort_assigned = true;
        }
    }
}
