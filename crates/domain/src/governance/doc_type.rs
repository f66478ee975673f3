//! Document type aggregate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::{AggregateRoot, PendingEvents};
use crate::event::EventRecord;

use super::events::{ChangeKind, DocTypeChanged};
use super::GovernanceError;

/// A document type: a code, a display name, and the workflow phases a
/// document of this type may pass through. Every state change raises a
/// [`DocTypeChanged`] event on the pending list.
#[derive(Debug)]
pub struct DocType {
    id: String,
    code: String,
    name: String,
    description: Option<String>,
    allowed_phase_codes: Vec<String>,
    default_phase_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pending: PendingEvents,
}

impl DocType {
    /// Creates a new document type and raises the `CREATED` event.
    pub fn create(
        code: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        allowed_phase_codes: Vec<String>,
        default_phase_code: impl Into<String>,
    ) -> Result<Self, GovernanceError> {
        let code = code.into();
        let name = name.into();
        let default_phase_code = default_phase_code.into();

        if code.trim().is_empty() {
            return Err(GovernanceError::CodeRequired);
        }
        if name.trim().is_empty() {
            return Err(GovernanceError::NameRequired);
        }
        if !allowed_phase_codes.contains(&default_phase_code) {
            return Err(GovernanceError::DefaultPhaseNotAllowed {
                default_phase: default_phase_code,
            });
        }

        let now = Utc::now();
        let mut doc_type = Self {
            id: Uuid::new_v4().to_string(),
            code,
            name,
            description,
            allowed_phase_codes,
            default_phase_code,
            created_at: now,
            updated_at: now,
            pending: PendingEvents::new(),
        };
        doc_type.raise_changed(ChangeKind::Created)?;
        Ok(doc_type)
    }

    /// Updates the display name and description, raising `UPDATED`.
    pub fn update_basic_info(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<(), GovernanceError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GovernanceError::NameRequired);
        }

        self.name = name;
        self.description = description;
        self.updated_at = Utc::now();
        self.raise_changed(ChangeKind::Updated)
    }

    /// Replaces the allowed phase list, raising `UPDATED`.
    pub fn set_phases(
        &mut self,
        allowed_phase_codes: Vec<String>,
        default_phase_code: impl Into<String>,
    ) -> Result<(), GovernanceError> {
        let default_phase_code = default_phase_code.into();
        if !allowed_phase_codes.contains(&default_phase_code) {
            return Err(GovernanceError::DefaultPhaseNotAllowed {
                default_phase: default_phase_code,
            });
        }

        self.allowed_phase_codes = allowed_phase_codes;
        self.default_phase_code = default_phase_code;
        self.updated_at = Utc::now();
        self.raise_changed(ChangeKind::Updated)
    }

    /// Marks the document type deleted, raising `DELETED`.
    pub fn delete(&mut self) -> Result<(), GovernanceError> {
        self.updated_at = Utc::now();
        self.raise_changed(ChangeKind::Deleted)
    }

    fn raise_changed(&mut self, operation: ChangeKind) -> Result<(), GovernanceError> {
        let event = DocTypeChanged {
            doc_type_id: self.id.clone(),
            doc_type_code: self.code.clone(),
            name: self.name.clone(),
            status: "ENABLED".to_string(),
            operation,
        };
        let record = EventRecord::capture(&event)?;
        self.add_domain_event(record);
        Ok(())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn allowed_phase_codes(&self) -> &[String] {
        &self.allowed_phase_codes
    }

    pub fn default_phase_code(&self) -> &str {
        &self.default_phase_code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl AggregateRoot for DocType {
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
