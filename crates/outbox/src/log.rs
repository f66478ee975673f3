//! The integration event log row and its delivery state machine.

use chrono::{DateTime, Utc};
use common::EventId;
use domain::{DomainEvent, EventRecord};

use crate::error::{OutboxError, Result};

/// Delivery state of an outbox row.
///
/// `Pending → InProgress → {Published | InError}`. `InError → InProgress`
/// is allowed for an external retry sweep; `Published` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLogState {
    InError = -1,
    Pending = 0,
    InProgress = 1,
    Published = 2,
}

impl EventLogState {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::InError),
            0 => Some(Self::Pending),
            1 => Some(Self::InProgress),
            2 => Some(Self::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventLogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InError => write!(f, "InError"),
            Self::Pending => write!(f, "Pending"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Published => write!(f, "Published"),
        }
    }
}

/// One durable outbox row per captured domain event.
///
/// Created `Pending` inside the same save that persists the business
/// change, so event durability and business durability are atomic. The
/// identifying columns are fixed at capture; only the delivery fields
/// (`state`, `times_sent`, `last_update_time`, `error`) move afterwards,
/// and only through the transition methods.
#[derive(Debug, Clone)]
pub struct IntegrationEventLog {
    id: EventId,
    event_name: String,
    event_type_name: String,
    identifier: Option<String>,
    content: String,
    create_time: DateTime<Utc>,
    sequence: i32,
    last_update_time: Option<DateTime<Utc>>,
    times_sent: i32,
    state: EventLogState,
    error: Option<String>,
}

impl IntegrationEventLog {
    /// Builds a `Pending` row from a captured event record. The content
    /// column snapshots the event payload as it was at capture time.
    pub fn capture(record: &EventRecord) -> Result<Self> {
        Ok(Self {
            id: record.id(),
            event_name: record.event_name().to_string(),
            event_type_name: record.event_type_name().to_string(),
            identifier: record.identifier().map(str::to_string),
            content: serde_json::to_string(record.payload())?,
            create_time: record.create_time(),
            sequence: record.concurrent_sort(),
            last_update_time: None,
            times_sent: 0,
            state: EventLogState::Pending,
            error: None,
        })
    }

    /// Rehydrates a row from persisted columns.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_columns(
        id: EventId,
        event_name: String,
        event_type_name: String,
        identifier: Option<String>,
        content: String,
        create_time: DateTime<Utc>,
        sequence: i32,
        last_update_time: Option<DateTime<Utc>>,
        times_sent: i32,
        state: EventLogState,
        error: Option<String>,
    ) -> Self {
        Self {
            id,
            event_name,
            event_type_name,
            identifier,
            content,
            create_time,
            sequence,
            last_update_time,
            times_sent,
            state,
            error,
        }
    }

    /// Deserializes the content snapshot back into the typed event.
    pub fn decode<E: DomainEvent>(&self) -> Result<E> {
        Ok(serde_json::from_str(&self.content)?)
    }

    pub fn is_published(&self) -> bool {
        self.state == EventLogState::Published
    }

    /// Moves the row to `InProgress`. Allowed from `Pending` and from
    /// `InError` (an external re-drive).
    pub fn mark_in_progress(&mut self, occurred_at: DateTime<Utc>) -> Result<()> {
        self.transition(EventLogState::InProgress, occurred_at)?;
        self.error = None;
        Ok(())
    }

    /// Moves the row to the terminal `Published` state.
    pub fn mark_published(&mut self, occurred_at: DateTime<Utc>) -> Result<()> {
        self.transition(EventLogState::Published, occurred_at)
    }

    /// Moves the row to `InError`, recording the failure text.
    pub fn mark_in_error(
        &mut self,
        error: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<()> {
        self.transition(EventLogState::InError, occurred_at)?;
        self.error = Some(error.into());
        Ok(())
    }

    fn transition(&mut self, next: EventLogState, occurred_at: DateTime<Utc>) -> Result<()> {
        if self.is_published() {
            return Err(OutboxError::StateConflict {
                id: self.id,
                attempted: next,
            });
        }

        self.state = next;
        self.times_sent += 1;
        self.last_update_time = Some(occurred_at);
        Ok(())
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

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    pub fn sequence(&self) -> i32 {
        self.sequence
    }

    pub fn last_update_time(&self) -> Option<DateTime<Utc>> {
        self.last_update_time
    }

    pub fn times_sent(&self) -> i32 {
        self.times_sent
    }

    pub fn state(&self) -> EventLogState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
