//! Archival and deletion-metadata models.
//!
//! Permanent deletion must write a durable snapshot BEFORE the row is
//! destroyed; soft deletion with a reason replaces the camera metadata with a
//! structured record.

use crate::models::camera::{Camera, CameraType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable snapshot archived before a camera row is permanently destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraArchiveRecord {
    pub camera_id: i64,
    pub name: String,
    pub camera_type: CameraType,
    pub location_id: Option<i64>,
    pub configuration_json: String,
    pub created_on: DateTime<Utc>,
    pub deleted_on: DateTime<Utc>,
    pub deleted_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CameraArchiveRecord {
    /// Snapshots a camera at the moment of permanent deletion.
    pub fn snapshot(camera: &Camera, deleted_by: Uuid, reason: Option<String>) -> Self {
        Self {
            camera_id: camera.id,
            name: camera.name.clone(),
            camera_type: camera.camera_type,
            location_id: camera.location_id,
            configuration_json: camera.configuration_json.clone(),
            created_on: camera.created_on,
            deleted_on: Utc::now(),
            deleted_by,
            reason,
        }
    }
}

/// Structured metadata written to a soft-deleted camera when a reason was
/// supplied. This REPLACES any prior metadata on the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionMetadata {
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub deletion_type: String,
}

impl DeletionMetadata {
    /// Builds the soft-delete record for the given reason.
    pub fn soft_delete(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            timestamp: Utc::now(),
            deletion_type: "Soft Delete".to_string(),
        }
    }
}
