//! Governance domain events.

use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

/// Kind of change an aggregate went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "CREATED"),
            ChangeKind::Updated => write!(f, "UPDATED"),
            ChangeKind::Deleted => write!(f, "DELETED"),
        }
    }
}

/// A document type was created, updated, or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTypeChanged {
    pub doc_type_id: String,
    pub doc_type_code: String,
    pub name: String,
    pub status: String,
    pub operation: ChangeKind,
}

impl DomainEvent for DocTypeChanged {
    fn event_name(&self) -> &'static str {
        "DocTypeChanged"
    }

    fn identifier(&self) -> Option<String> {
        Some(self.doc_type_id.clone())
    }
}

/// A workflow phase definition was created, updated, or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseChanged {
    pub phase_id: String,
    pub phase_code: String,
    pub display_name: String,
    pub is_active: bool,
    pub operation: ChangeKind,
}

impl DomainEvent for PhaseChanged {
    fn event_name(&self) -> &'static str {
        "PhaseChanged"
    }

    fn identifier(&self) -> Option<String> {
        Some(self.phase_id.clone())
    }
}
