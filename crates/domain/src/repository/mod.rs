//! Storage boundary consumed by the lifecycle orchestrator.
//!
//! Persistence mechanics live behind these traits; the orchestrator only
//! depends on the contract. Optimistic concurrency is expressed through
//! [`RepositoryError::Conflict`], which callers translate into a retryable
//! user-facing condition.

pub mod memory;

use crate::models::{AuditEntry, Camera, CameraArchiveRecord, Location};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::{
    InMemoryAuditLogStore, InMemoryCameraArchive, InMemoryCameraRepository,
    InMemoryConfigurationReferenceStore, InMemoryLocationRepository, InMemoryUserDirectory,
};

/// Errors surfaced at the storage boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Row not found")]
    NotFound,

    /// The row version changed since it was loaded.
    #[error("Row version conflict")]
    Conflict,

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Camera persistence contract.
///
/// `add`/`update`/`remove` stage changes; `save` atomically commits the unit
/// of changes. Version checks happen at `update` time.
#[async_trait]
pub trait CameraRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Camera>, RepositoryError>;

    /// Case-insensitive, trimmed name match among non-deleted cameras sharing
    /// the given location (or both having none).
    async fn find_by_name_and_location(
        &self,
        name: &str,
        location_id: Option<i64>,
    ) -> Result<Option<Camera>, RepositoryError>;

    async fn find_by_location(&self, location_id: i64) -> Result<Vec<Camera>, RepositoryError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Camera>, RepositoryError>;

    /// Stages a new camera and returns it with its assigned id.
    async fn add(&self, camera: Camera) -> Result<Camera, RepositoryError>;

    /// Stages an update; fails with [`RepositoryError::Conflict`] when the
    /// row version no longer matches.
    async fn update(&self, camera: Camera) -> Result<Camera, RepositoryError>;

    /// Stages removal of the row.
    async fn remove(&self, id: i64) -> Result<(), RepositoryError>;

    /// Atomically commits all staged changes.
    async fn save(&self) -> Result<(), RepositoryError>;
}

/// Location lookup contract.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Location>, RepositoryError>;
}

/// Audit trail contract: existence checks gate permanent deletion, and the
/// orchestrator records its own entries here.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    async fn has_entries(&self, entity_type: &str, entity_id: i64)
        -> Result<bool, RepositoryError>;

    async fn record(&self, entry: AuditEntry) -> Result<(), RepositoryError>;
}

/// Durable archive written before permanent destruction. A failure here is
/// fatal to the deletion, never advisory.
#[async_trait]
pub trait CameraArchive: Send + Sync {
    async fn archive(&self, record: CameraArchiveRecord) -> Result<(), RepositoryError>;
}

/// Checks whether other subsystems still reference a camera's configuration.
#[async_trait]
pub trait ConfigurationReferenceStore: Send + Sync {
    async fn has_references(&self, camera_id: i64) -> Result<bool, RepositoryError>;
}

/// Resolves user display names for enriched views.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, RepositoryError>;
}
