//! Audit models for camera lifecycle operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audited camera lifecycle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    CameraCreate,
    CameraUpdate,
    CameraActivate,
    CameraDeactivate,
    CameraSoftDelete,
    CameraPermanentDelete,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::CameraCreate => write!(f, "camera.create"),
            AuditAction::CameraUpdate => write!(f, "camera.update"),
            AuditAction::CameraActivate => write!(f, "camera.activate"),
            AuditAction::CameraDeactivate => write!(f, "camera.deactivate"),
            AuditAction::CameraSoftDelete => write!(f, "camera.soft_delete"),
            AuditAction::CameraPermanentDelete => write!(f, "camera.permanent_delete"),
        }
    }
}

/// A single field change captured for the update audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl FieldChange {
    pub fn new(
        field: impl Into<String>,
        old: Option<String>,
        new: Option<String>,
    ) -> Self {
        Self {
            field: field.into(),
            old,
            new,
        }
    }

    /// Records a change only when the values actually differ.
    pub fn if_changed(field: impl Into<String>, old: &str, new: &str) -> Option<Self> {
        if old != new {
            Some(Self::new(
                field,
                Some(old.to_string()),
                Some(new.to_string()),
            ))
        } else {
            None
        }
    }
}

/// An audit log entry recorded by the lifecycle orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub entity_type: String,
    pub entity_id: i64,
    pub action: AuditAction,
    pub actor_id: Uuid,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<FieldChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Builds a camera audit entry with no changes attached.
    pub fn camera(action: AuditAction, camera_id: i64, actor_id: Uuid) -> Self {
        Self {
            entity_type: "camera".to_string(),
            entity_id: camera_id,
            action,
            actor_id,
            changes: Vec::new(),
            note: None,
            recorded_at: Utc::now(),
        }
    }

    /// Attaches field changes.
    pub fn with_changes(mut self, changes: Vec<FieldChange>) -> Self {
        self.changes = changes;
        self
    }

    /// Attaches a free-form note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Compact `field: old -> new` summary used for the diff-style log line.
    pub fn change_summary(&self) -> String {
        self.changes
            .iter()
            .map(|c| {
                format!(
                    "{}: {} -> {}",
                    c.field,
                    c.old.as_deref().unwrap_or("-"),
                    c.new.as_deref().unwrap_or("-")
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_display() {
        assert_eq!(AuditAction::CameraCreate.to_string(), "camera.create");
        assert_eq!(
            AuditAction::CameraPermanentDelete.to_string(),
            "camera.permanent_delete"
        );
    }

    #[test]
    fn test_field_change_if_changed() {
        assert!(FieldChange::if_changed("name", "a", "a").is_none());

        let change = FieldChange::if_changed("name", "a", "b").unwrap();
        assert_eq!(change.field, "name");
        assert_eq!(change.old.as_deref(), Some("a"));
        assert_eq!(change.new.as_deref(), Some("b"));
    }

    #[test]
    fn test_change_summary() {
        let entry = AuditEntry::camera(AuditAction::CameraUpdate, 4, Uuid::nil()).with_changes(
            vec![
                FieldChange::new("name", Some("Old".into()), Some("New".into())),
                FieldChange::new("type", Some("ip".into()), Some("onvif".into())),
            ],
        );
        assert_eq!(entry.change_summary(), "name: Old -> New, type: ip -> onvif");
    }
}
