//! Error types for camera lifecycle operations.

use crate::repository::RepositoryError;
use thiserror::Error;

/// Failure modes of the lifecycle orchestrator, mirroring the error taxonomy
/// callers are expected to handle.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Synchronous validation failure; the message aggregates every
    /// violation, not just the first.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Camera {0} not found")]
    NotFound(i64),

    /// Deletion blocked by dependencies; all blockers are accumulated so the
    /// caller can resolve them in one pass.
    #[error("Cannot delete camera: {}", .0.join("; "))]
    DependencyBlocked(Vec<String>),

    /// The row changed between load and save. Retryable by the caller.
    #[error("Camera was modified by another user, please retry")]
    ConcurrentModification,

    /// Archival failed during permanent deletion; the row was left intact.
    #[error("Failed to archive camera before permanent deletion: {0}")]
    ArchiveFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for CameraError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict => CameraError::ConcurrentModification,
            RepositoryError::NotFound => {
                CameraError::Internal("row disappeared during operation".to_string())
            }
            RepositoryError::Storage(msg) => CameraError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_blocked_joins_all_blockers() {
        let err = CameraError::DependencyBlocked(vec![
            "Camera has an active stream".to_string(),
            "Camera has historical data".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Cannot delete camera: Camera has an active stream; Camera has historical data"
        );
    }

    #[test]
    fn test_conflict_maps_to_concurrent_modification() {
        let err: CameraError = RepositoryError::Conflict.into();
        assert!(matches!(err, CameraError::ConcurrentModification));
        assert!(err.to_string().contains("please retry"));
    }

    #[test]
    fn test_storage_maps_to_internal() {
        let err: CameraError = RepositoryError::Storage("disk full".to_string()).into();
        assert!(matches!(err, CameraError::Internal(_)));
    }
}
