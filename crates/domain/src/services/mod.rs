//! Domain services for camera lifecycle management.
//!
//! Services contain business logic that operates on domain models.

pub mod camera_lifecycle;
pub mod camera_service;
pub mod side_effects;

pub use camera_lifecycle::{Actor, ActorRole, CameraLifecycleService, DeletionOutcome};
pub use camera_service::{CameraService, CameraServiceError, MockCameraService};
pub use side_effects::best_effort;
