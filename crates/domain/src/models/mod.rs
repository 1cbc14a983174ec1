//! Domain models for camera lifecycle management.

pub mod archive;
pub mod audit;
pub mod camera;
pub mod camera_config;
pub mod health;
pub mod location;

pub use archive::{CameraArchiveRecord, DeletionMetadata};
pub use audit::{AuditAction, AuditEntry, FieldChange};
pub use camera::{
    mask_connection_string, Camera, CameraStatus, CameraType, CameraView, CreateCameraRequest,
    DeleteCameraRequest, PasswordUpdate, UpdateCameraRequest,
};
pub use camera_config::{CameraConfiguration, CameraConfigurationUpdate};
pub use health::{health_score, ConnectionTestResult, HealthCheckResult, StreamInfo};
pub use location::Location;
