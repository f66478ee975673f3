//! Workflow phase definition aggregate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::{AggregateRoot, PendingEvents};
use crate::event::EventRecord;

use super::events::{ChangeKind, PhaseChanged};
use super::GovernanceError;

/// A workflow phase: a globally unique code, a display name, an ordering
/// number, and the phases a document may transition to from here.
#[derive(Debug)]
pub struct PhaseDefinition {
    id: String,
    phase_code: String,
    display_name: String,
    order: i32,
    allowed_transitions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pending: PendingEvents,
}

impl PhaseDefinition {
    /// Creates a new phase definition and raises the `CREATED` event.
    pub fn create(
        phase_code: impl Into<String>,
        display_name: impl Into<String>,
        order: i32,
        allowed_transitions: Vec<String>,
    ) -> Result<Self, GovernanceError> {
        let phase_code = phase_code.into();
        let display_name = display_name.into();

        if phase_code.trim().is_empty() {
            return Err(GovernanceError::CodeRequired);
        }
        if display_name.trim().is_empty() {
            return Err(GovernanceError::NameRequired);
        }

        let now = Utc::now();
        let mut phase = Self {
            id: Uuid::new_v4().to_string(),
            phase_code,
            display_name,
            order,
            allowed_transitions,
            created_at: now,
            updated_at: now,
            pending: PendingEvents::new(),
        };
        phase.raise_changed(ChangeKind::Created)?;
        Ok(phase)
    }

    /// Renames the phase, raising `UPDATED`.
    pub fn rename(&mut self, display_name: impl Into<String>) -> Result<(), GovernanceError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(GovernanceError::NameRequired);
        }

        self.display_name = display_name;
        self.updated_at = Utc::now();
        self.raise_changed(ChangeKind::Updated)
    }

    /// Replaces the allowed transition targets, raising `UPDATED`.
    pub fn set_transitions(
        &mut self,
        allowed_transitions: Vec<String>,
    ) -> Result<(), GovernanceError> {
        self.allowed_transitions = allowed_transitions;
        self.updated_at = Utc::now();
        self.raise_changed(ChangeKind::Updated)
    }

    /// Marks the phase deleted, raising `DELETED`.
    pub fn delete(&mut self) -> Result<(), GovernanceError> {
        self.updated_at = Utc::now();
        self.raise_changed(ChangeKind::Deleted)
    }

    fn raise_changed(&mut self, operation: ChangeKind) -> Result<(), GovernanceError> {
        let event = PhaseChanged {
            phase_id: self.id.clone(),
            phase_code: self.phase_code.clone(),
            display_name: self.display_name.clone(),
            is_active: true,
            operation,
        };
        let record = EventRecord::capture(&event)?;
        self.add_domain_event(record);
        Ok(())
    }

    pub fn phase_code(&self) -> &str {
        &self.phase_code
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn allowed_transitions(&self) -> &[String] {
        &self.allowed_transitions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl AggregateRoot for PhaseDefinition {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_raises_created_event() {
        let phase =
            PhaseDefinition::create("DRAFT", "Draft", 1, vec!["REVIEW".to_string()]).unwrap();

        let events = phase.domain_events();
        assert_eq!(events.len(), 1);

        let event: PhaseChanged = events[0].decode().unwrap();
        assert_eq!(event.phase_code, "DRAFT");
        assert_eq!(event.operation, ChangeKind::Created);
        assert!(event.is_active);
    }

    #[test]
    fn rename_rejects_blank_name() {
        let mut phase = PhaseDefinition::create("DRAFT", "Draft", 1, vec![]).unwrap();
        assert!(matches!(
            phase.rename("   "),
            Err(GovernanceError::NameRequired)
        ));
        // Failed rename must not raise an event.
        assert_eq!(phase.domain_events().len(), 1);
    }

    #[test]
    fn transitions_update_raises_event() {
        let mut phase = PhaseDefinition::create("DRAFT", "Draft", 1, vec![]).unwrap();
        phase
            .set_transitions(vec!["REVIEW".to_string(), "FINAL".to_string()])
            .unwrap();

        assert_eq!(phase.domain_events().len(), 2);
        assert_eq!(phase.allowed_transitions().len(), 2);
    }
}
