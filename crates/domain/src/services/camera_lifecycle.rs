//! Camera lifecycle orchestration: create, update, delete, activation and
//! health-result application.
//!
//! Every operation takes the acting user explicitly; nothing here reads
//! identity from ambient context. Validation aggregates all violations before
//! failing, deletion distinguishes advisory cleanup from fatal steps, and
//! negative deletion results are outcomes rather than errors.

use crate::error::CameraError;
use crate::models::{
    AuditAction, AuditEntry, Camera, CameraArchiveRecord, CameraConfiguration, CameraStatus,
    CameraView, CreateCameraRequest, DeleteCameraRequest, DeletionMetadata, FieldChange,
    HealthCheckResult, PasswordUpdate, UpdateCameraRequest,
};
use crate::repository::{
    AuditLogStore, CameraArchive, CameraRepository, ConfigurationReferenceStore,
    LocationRepository, UserDirectory,
};
use crate::services::camera_service::CameraService;
use crate::services::side_effects::best_effort;
use chrono::Utc;
use shared::secret::SecretCipher;
use std::sync::Arc;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Role of the acting user, as resolved by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Administrator,
    Operator,
    Viewer,
}

/// The authenticated user performing an operation.
///
/// Passed explicitly into every lifecycle operation; the orchestrator never
/// resolves identity on its own.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: ActorRole) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, ActorRole::Administrator)
    }

    pub fn operator(user_id: Uuid) -> Self {
        Self::new(user_id, ActorRole::Operator)
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Administrator
    }
}

/// Result of a deletion request.
///
/// Missing and already-deleted targets are ordinary outcomes, not faults; the
/// error channel is reserved for blockers, conflicts and storage failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted { permanent: bool, message: String },
    NotFound,
    AlreadyDeleted,
}

/// Orchestrates camera lifecycle operations over the storage and runtime
/// boundaries.
pub struct CameraLifecycleService {
    cameras: Arc<dyn CameraRepository>,
    locations: Arc<dyn LocationRepository>,
    audit: Arc<dyn AuditLogStore>,
    archive: Arc<dyn CameraArchive>,
    config_refs: Arc<dyn ConfigurationReferenceStore>,
    users: Arc<dyn UserDirectory>,
    camera_service: Arc<dyn CameraService>,
    cipher: SecretCipher,
}

impl CameraLifecycleService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cameras: Arc<dyn CameraRepository>,
        locations: Arc<dyn LocationRepository>,
        audit: Arc<dyn AuditLogStore>,
        archive: Arc<dyn CameraArchive>,
        config_refs: Arc<dyn ConfigurationReferenceStore>,
        users: Arc<dyn UserDirectory>,
        camera_service: Arc<dyn CameraService>,
        cipher: SecretCipher,
    ) -> Self {
        Self {
            cameras,
            locations,
            audit,
            archive,
            config_refs,
            users,
            camera_service,
            cipher,
        }
    }

    /// Registers a new camera.
    ///
    /// The camera starts `Inactive`; connectivity is established by later
    /// health checks or explicit activation, never during registration.
    pub async fn create_camera(
        &self,
        mut request: CreateCameraRequest,
        actor: Actor,
    ) -> Result<CameraView, CameraError> {
        request.normalize();
        let mut violations = request_violations(request.validate());

        if self
            .cameras
            .find_by_name_and_location(&request.name, request.location_id)
            .await?
            .is_some()
        {
            violations.push(format!(
                "name: A camera named '{}' already exists at this location",
                request.name
            ));
        }

        self.check_location(request.location_id, &mut violations)
            .await?;

        let configuration = CameraConfiguration::from_overrides(request.configuration.as_ref());
        if let Err(config_violations) = configuration.validate_all() {
            violations.extend(config_violations);
        }

        if !violations.is_empty() {
            violations.sort();
            violations.dedup();
            return Err(CameraError::Validation(violations.join("; ")));
        }

        let sealed_password = match request.password.as_deref() {
            Some(pw) if !pw.is_empty() => Some(
                self.cipher
                    .seal(pw)
                    .map_err(|e| CameraError::Internal(e.to_string()))?,
            ),
            _ => None,
        };

        let configuration_json = configuration
            .to_json()
            .map_err(|e| CameraError::Internal(e.to_string()))?;

        let camera = Camera {
            id: 0,
            name: request.name,
            description: request.description,
            manufacturer: request.manufacturer,
            model: request.model,
            firmware_version: request.firmware_version,
            serial_number: request.serial_number,
            camera_type: request.camera_type,
            connection_string: request.connection_string,
            username: request.username,
            sealed_password,
            status: CameraStatus::Inactive,
            priority: request.priority,
            enable_facial_recognition: request.enable_facial_recognition,
            configuration_json,
            metadata: request.metadata,
            location_id: request.location_id,
            created_by: actor.user_id,
            created_on: Utc::now(),
            modified_by: None,
            modified_on: None,
            is_deleted: false,
            last_health_check_at: None,
            last_online_at: None,
            consecutive_failures: 0,
            row_version: 0,
        };

        let camera = self.cameras.add(camera).await?;
        self.cameras.save().await?;

        self.audit
            .record(AuditEntry::camera(
                AuditAction::CameraCreate,
                camera.id,
                actor.user_id,
            ))
            .await?;

        tracing::info!(
            camera_id = %camera.id,
            name = %camera.name,
            camera_type = %camera.camera_type,
            actor_id = %actor.user_id,
            "Camera registered"
        );

        self.build_view(&camera).await
    }

    /// Updates a camera in full.
    ///
    /// Configuration overrides merge into the stored configuration; a change
    /// to the connection string or camera type resets connection state so the
    /// next health check re-establishes it from scratch.
    pub async fn update_camera(
        &self,
        mut request: UpdateCameraRequest,
        actor: Actor,
    ) -> Result<CameraView, CameraError> {
        let mut camera = self
            .cameras
            .find_by_id(request.camera_id)
            .await?
            .filter(|c| !c.is_deleted)
            .ok_or(CameraError::NotFound(request.camera_id))?;

        request.normalize();
        let mut violations = request_violations(request.validate());

        if let Some(other) = self
            .cameras
            .find_by_name_and_location(&request.name, request.location_id)
            .await?
        {
            if other.id != camera.id {
                violations.push(format!(
                    "name: A camera named '{}' already exists at this location",
                    request.name
                ));
            }
        }

        self.check_location(request.location_id, &mut violations)
            .await?;

        let existing_configuration =
            CameraConfiguration::from_json(&camera.configuration_json).unwrap_or_default();
        let configuration = match request.configuration.as_ref() {
            Some(overrides) => existing_configuration.merged_with(overrides),
            None => existing_configuration,
        };
        if let Err(config_violations) = configuration.validate_all() {
            violations.extend(config_violations);
        }

        if !violations.is_empty() {
            violations.sort();
            violations.dedup();
            return Err(CameraError::Validation(violations.join("; ")));
        }

        let original_name = camera.name.clone();
        let original_connection = camera.masked_connection_string();
        let original_type = camera.camera_type;
        let was_active = camera.is_active();

        let connection_changed = camera.connection_string != request.connection_string;
        let type_changed = camera.camera_type != request.camera_type;

        camera.name = request.name;
        camera.description = request.description;
        camera.camera_type = request.camera_type;
        camera.connection_string = request.connection_string;
        camera.username = request.username;
        camera.manufacturer = request.manufacturer;
        camera.model = request.model;
        camera.firmware_version = request.firmware_version;
        camera.serial_number = request.serial_number;
        camera.metadata = request.metadata;
        camera.priority = request.priority;
        camera.enable_facial_recognition = request.enable_facial_recognition;
        camera.location_id = request.location_id;
        camera.configuration_json = configuration
            .to_json()
            .map_err(|e| CameraError::Internal(e.to_string()))?;

        match PasswordUpdate::from(request.password) {
            PasswordUpdate::Keep => {}
            PasswordUpdate::Clear => camera.sealed_password = None,
            PasswordUpdate::Replace(pw) => {
                camera.sealed_password = Some(
                    self.cipher
                        .seal(&pw)
                        .map_err(|e| CameraError::Internal(e.to_string()))?,
                );
            }
        }

        if request.is_active != was_active {
            camera.status = if request.is_active {
                CameraStatus::Active
            } else {
                CameraStatus::Inactive
            };
        }

        if connection_changed || type_changed {
            camera.status = CameraStatus::Inactive;
            camera.consecutive_failures = 0;
            camera.last_health_check_at = None;
        }

        // Audited as an activation change only if one actually took effect;
        // the critical-change reset can override the requested flag.
        let activation_change = {
            let now_active = camera.is_active();
            (now_active != was_active).then_some(now_active)
        };

        camera.modified_by = Some(actor.user_id);
        camera.modified_on = Some(Utc::now());

        let camera = self.cameras.update(camera).await?;
        self.cameras.save().await?;

        let changes: Vec<FieldChange> = [
            FieldChange::if_changed("name", &original_name, &camera.name),
            FieldChange::if_changed(
                "connectionString",
                &original_connection,
                &camera.masked_connection_string(),
            ),
            FieldChange::if_changed(
                "cameraType",
                &original_type.to_string(),
                &camera.camera_type.to_string(),
            ),
        ]
        .into_iter()
        .flatten()
        .collect();

        let entry = AuditEntry::camera(AuditAction::CameraUpdate, camera.id, actor.user_id)
            .with_changes(changes);
        tracing::info!(
            camera_id = %camera.id,
            actor_id = %actor.user_id,
            changes = %entry.change_summary(),
            "Camera updated"
        );
        self.audit.record(entry).await?;

        if let Some(active) = activation_change {
            let action = if active {
                AuditAction::CameraActivate
            } else {
                AuditAction::CameraDeactivate
            };
            self.audit
                .record(AuditEntry::camera(action, camera.id, actor.user_id))
                .await?;
        }

        self.build_view(&camera).await
    }

    /// Deletes a camera, softly by default or permanently on request.
    ///
    /// Blockers are accumulated and reported together. `force` overrides
    /// dependency blockers but never the administrator requirement for
    /// permanent deletion. Archival before permanent destruction is fatal;
    /// every other cleanup step is advisory.
    pub async fn delete_camera(
        &self,
        request: DeleteCameraRequest,
        actor: Actor,
    ) -> Result<DeletionOutcome, CameraError> {
        let Some(camera) = self.cameras.find_by_id(request.camera_id).await? else {
            tracing::info!(camera_id = %request.camera_id, "Delete requested for unknown camera");
            return Ok(DeletionOutcome::NotFound);
        };

        if camera.is_deleted && !request.permanent {
            return Ok(DeletionOutcome::AlreadyDeleted);
        }

        let blockers = self.collect_blockers(&camera, &request, actor).await?;
        if !blockers.is_empty() {
            return Err(CameraError::DependencyBlocked(blockers));
        }

        let id = camera.id;
        best_effort("stop_stream", id, self.camera_service.stop_stream(id)).await;
        best_effort(
            "cancel_facial_recognition_tasks",
            id,
            self.camera_service.cancel_facial_recognition_tasks(id),
        )
        .await;
        best_effort(
            "stop_frame_capture",
            id,
            self.camera_service.stop_frame_capture(id),
        )
        .await;
        best_effort("clear_cache", id, self.camera_service.clear_cache(id)).await;
        best_effort(
            "cleanup_file_system_resources",
            id,
            self.camera_service
                .cleanup_file_system_resources(id, request.permanent),
        )
        .await;

        let outcome = if request.permanent {
            self.destroy_camera(camera, &request, actor).await?
        } else {
            self.soft_delete_camera(camera, &request, actor).await?
        };

        best_effort(
            "notify_camera_deletion",
            id,
            self.camera_service
                .notify_camera_deletion(id, request.permanent),
        )
        .await;
        best_effort(
            "update_monitoring_systems",
            id,
            self.camera_service
                .update_monitoring_systems(id, request.permanent),
        )
        .await;

        Ok(outcome)
    }

    /// Marks the camera active. Soft-deleted cameras cannot be activated.
    pub async fn activate_camera(
        &self,
        camera_id: i64,
        actor: Actor,
    ) -> Result<CameraView, CameraError> {
        self.set_activation(camera_id, actor, true).await
    }

    /// Marks the camera inactive. Soft-deleted cameras cannot be deactivated.
    pub async fn deactivate_camera(
        &self,
        camera_id: i64,
        actor: Actor,
    ) -> Result<CameraView, CameraError> {
        self.set_activation(camera_id, actor, false).await
    }

    /// Applies a health-check result to the camera row: status, failure
    /// counter and timestamps.
    pub async fn apply_health_result(
        &self,
        result: &HealthCheckResult,
    ) -> Result<(), CameraError> {
        let Some(mut camera) = self.cameras.find_by_id(result.camera_id).await? else {
            tracing::debug!(camera_id = %result.camera_id, "Health result for unknown camera, ignoring");
            return Ok(());
        };
        if camera.is_deleted {
            return Ok(());
        }

        if result.is_recovery() {
            tracing::info!(camera_id = %camera.id, name = %camera.name, "Camera recovered");
        } else if result.is_new_failure() {
            tracing::warn!(
                camera_id = %camera.id,
                name = %camera.name,
                error = %result.error_message.as_deref().unwrap_or("unknown"),
                "Camera went down"
            );
        }

        camera.status = result.status;
        camera.last_health_check_at = Some(result.checked_at);
        if result.is_healthy {
            camera.consecutive_failures = 0;
            camera.last_online_at = Some(result.checked_at);
        } else {
            camera.consecutive_failures = camera.consecutive_failures.saturating_add(1);
        }

        self.cameras.update(camera).await?;
        self.cameras.save().await?;
        Ok(())
    }

    async fn set_activation(
        &self,
        camera_id: i64,
        actor: Actor,
        active: bool,
    ) -> Result<CameraView, CameraError> {
        let mut camera = self
            .cameras
            .find_by_id(camera_id)
            .await?
            .ok_or(CameraError::NotFound(camera_id))?;

        if camera.is_deleted {
            return Err(CameraError::Validation(
                "Cannot change activation of a deleted camera".to_string(),
            ));
        }

        camera.status = if active {
            CameraStatus::Active
        } else {
            CameraStatus::Inactive
        };
        camera.modified_by = Some(actor.user_id);
        camera.modified_on = Some(Utc::now());

        let camera = self.cameras.update(camera).await?;
        self.cameras.save().await?;

        let action = if active {
            AuditAction::CameraActivate
        } else {
            AuditAction::CameraDeactivate
        };
        self.audit
            .record(AuditEntry::camera(action, camera.id, actor.user_id))
            .await?;

        tracing::info!(
            camera_id = %camera.id,
            status = %camera.status,
            actor_id = %actor.user_id,
            "Camera activation changed"
        );

        self.build_view(&camera).await
    }

    /// Accumulates every reason the deletion cannot proceed. The
    /// administrator requirement for permanent deletion is checked last and
    /// is the one blocker `force` never clears.
    async fn collect_blockers(
        &self,
        camera: &Camera,
        request: &DeleteCameraRequest,
        actor: Actor,
    ) -> Result<Vec<String>, CameraError> {
        let mut blockers = Vec::new();

        if !request.force {
            if self.camera_service.is_streaming(camera.id).await {
                blockers.push("Camera has an active stream".to_string());
            }
            if self
                .camera_service
                .has_active_facial_recognition(camera.id)
                .await
            {
                blockers.push("Camera has active facial recognition tasks".to_string());
            }
            if request.permanent {
                if self.audit.has_entries("camera", camera.id).await? {
                    blockers.push("Camera has historical data".to_string());
                }
                if self.config_refs.has_references(camera.id).await? {
                    blockers
                        .push("Camera configuration is referenced by other records".to_string());
                }
            }
        }

        if request.permanent && !actor.is_admin() {
            blockers.push("Permanent deletion requires administrator rights".to_string());
        }

        Ok(blockers)
    }

    async fn soft_delete_camera(
        &self,
        mut camera: Camera,
        request: &DeleteCameraRequest,
        actor: Actor,
    ) -> Result<DeletionOutcome, CameraError> {
        camera.is_deleted = true;
        camera.status = CameraStatus::Inactive;
        camera.modified_by = Some(actor.user_id);
        camera.modified_on = Some(Utc::now());

        if let Some(reason) = request.reason.as_deref() {
            let metadata = DeletionMetadata::soft_delete(reason);
            camera.metadata = Some(
                serde_json::to_string(&metadata)
                    .map_err(|e| CameraError::Internal(e.to_string()))?,
            );
        }

        let camera = self.cameras.update(camera).await?;
        self.cameras.save().await?;

        let mut entry = AuditEntry::camera(AuditAction::CameraSoftDelete, camera.id, actor.user_id);
        if let Some(reason) = request.reason.as_deref() {
            entry = entry.with_note(reason);
        }
        self.audit.record(entry).await?;

        tracing::info!(
            camera_id = %camera.id,
            name = %camera.name,
            actor_id = %actor.user_id,
            "Camera soft-deleted"
        );

        Ok(DeletionOutcome::Deleted {
            permanent: false,
            message: "Camera deleted and can be restored".to_string(),
        })
    }

    async fn destroy_camera(
        &self,
        camera: Camera,
        request: &DeleteCameraRequest,
        actor: Actor,
    ) -> Result<DeletionOutcome, CameraError> {
        let record = CameraArchiveRecord::snapshot(&camera, actor.user_id, request.reason.clone());
        if let Err(err) = self.archive.archive(record).await {
            tracing::error!(
                camera_id = %camera.id,
                error = %err,
                "Archival failed, aborting permanent deletion"
            );
            return Err(CameraError::ArchiveFailed(err.to_string()));
        }

        self.cameras.remove(camera.id).await?;
        self.cameras.save().await?;

        let mut entry =
            AuditEntry::camera(AuditAction::CameraPermanentDelete, camera.id, actor.user_id);
        if let Some(reason) = request.reason.as_deref() {
            entry = entry.with_note(reason);
        }
        self.audit.record(entry).await?;

        tracing::info!(
            camera_id = %camera.id,
            name = %camera.name,
            actor_id = %actor.user_id,
            "Camera permanently deleted"
        );

        Ok(DeletionOutcome::Deleted {
            permanent: true,
            message: "Camera permanently deleted".to_string(),
        })
    }

    async fn check_location(
        &self,
        location_id: Option<i64>,
        violations: &mut Vec<String>,
    ) -> Result<(), CameraError> {
        if let Some(id) = location_id {
            let assignable = self
                .locations
                .find_by_id(id)
                .await?
                .is_some_and(|l| l.is_assignable());
            if !assignable {
                violations.push(format!(
                    "locationId: Location {} does not exist or is not active",
                    id
                ));
            }
        }
        Ok(())
    }

    async fn build_view(&self, camera: &Camera) -> Result<CameraView, CameraError> {
        let location_name = match camera.location_id {
            Some(id) => self.locations.find_by_id(id).await?.map(|l| l.name),
            None => None,
        };
        let created_by_name = self.users.display_name(camera.created_by).await?;
        Ok(CameraView::build(camera, location_name, created_by_name))
    }
}

/// Flattens validator errors into sorted `field: message` strings, matching
/// the aggregation style of configuration validation.
fn request_violations(result: Result<(), ValidationErrors>) -> Vec<String> {
    let Err(errors) = result else {
        return Vec::new();
    };
    let mut violations: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    violations.sort();
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_roles() {
        let admin = Actor::admin(Uuid::nil());
        assert!(admin.is_admin());

        let operator = Actor::operator(Uuid::nil());
        assert!(!operator.is_admin());

        let viewer = Actor::new(Uuid::nil(), ActorRole::Viewer);
        assert!(!viewer.is_admin());
    }

    #[test]
    fn test_request_violations_flattening() {
        let request = CreateCameraRequest {
            name: String::new(),
            description: None,
            camera_type: crate::models::CameraType::Ip,
            connection_string: String::new(),
            username: None,
            password: None,
            location_id: None,
            configuration: None,
            enable_facial_recognition: false,
            priority: 0,
            manufacturer: None,
            model: None,
            firmware_version: None,
            serial_number: None,
            metadata: None,
        };

        let violations = request_violations(request.validate());
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v.starts_with("name:")));
        assert!(violations
            .iter()
            .any(|v| v.starts_with("connection_string:")));
    }
}
