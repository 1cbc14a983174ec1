//! In-memory implementations of the storage traits.
//!
//! Used by the integration tests and as a reference for the staged
//! unit-of-changes semantics: mutations are staged and only become visible to
//! readers after `save`.

use crate::models::{AuditEntry, Camera, CameraArchiveRecord, Location};
use crate::repository::{
    AuditLogStore, CameraArchive, CameraRepository, ConfigurationReferenceStore,
    LocationRepository, RepositoryError, UserDirectory,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
enum StagedOp {
    Upsert(Camera),
    Remove,
}

#[derive(Debug, Default)]
struct CameraStoreInner {
    committed: HashMap<i64, Camera>,
    staged: HashMap<i64, StagedOp>,
    next_id: i64,
}

/// In-memory camera repository with optimistic-concurrency semantics.
pub struct InMemoryCameraRepository {
    inner: Mutex<CameraStoreInner>,
    fail_next_update: AtomicBool,
}

impl Default for InMemoryCameraRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCameraRepository {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CameraStoreInner {
                committed: HashMap::new(),
                staged: HashMap::new(),
                next_id: 1,
            }),
            fail_next_update: AtomicBool::new(false),
        }
    }

    /// Makes the next `update` call fail with a version conflict, simulating
    /// a concurrent writer committing between load and save.
    pub fn fail_next_update_with_conflict(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the committed row, bypassing staging. Test helper.
    pub fn committed(&self, id: i64) -> Option<Camera> {
        locked(&self.inner).committed.get(&id).cloned()
    }

    /// Number of committed rows. Test helper.
    pub fn committed_count(&self) -> usize {
        locked(&self.inner).committed.len()
    }
}

#[async_trait]
impl CameraRepository for InMemoryCameraRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Camera>, RepositoryError> {
        Ok(locked(&self.inner).committed.get(&id).cloned())
    }

    async fn find_by_name_and_location(
        &self,
        name: &str,
        location_id: Option<i64>,
    ) -> Result<Option<Camera>, RepositoryError> {
        let wanted = name.trim().to_lowercase();
        Ok(locked(&self.inner)
            .committed
            .values()
            .find(|c| {
                !c.is_deleted
                    && c.location_id == location_id
                    && c.name.trim().to_lowercase() == wanted
            })
            .cloned())
    }

    async fn find_by_location(&self, location_id: i64) -> Result<Vec<Camera>, RepositoryError> {
        Ok(locked(&self.inner)
            .committed
            .values()
            .filter(|c| !c.is_deleted && c.location_id == Some(location_id))
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Camera>, RepositoryError> {
        Ok(locked(&self.inner)
            .committed
            .values()
            .filter(|c| !c.is_deleted && c.created_by == user_id)
            .cloned()
            .collect())
    }

    async fn add(&self, mut camera: Camera) -> Result<Camera, RepositoryError> {
        let mut inner = locked(&self.inner);
        camera.id = inner.next_id;
        camera.row_version = 1;
        inner.next_id += 1;
        inner.staged.insert(camera.id, StagedOp::Upsert(camera.clone()));
        Ok(camera)
    }

    async fn update(&self, mut camera: Camera) -> Result<Camera, RepositoryError> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Conflict);
        }

        let mut inner = locked(&self.inner);
        let current = inner
            .committed
            .get(&camera.id)
            .ok_or(RepositoryError::NotFound)?;

        if current.row_version != camera.row_version {
            return Err(RepositoryError::Conflict);
        }

        camera.row_version += 1;
        inner.staged.insert(camera.id, StagedOp::Upsert(camera.clone()));
        Ok(camera)
    }

    async fn remove(&self, id: i64) -> Result<(), RepositoryError> {
        let mut inner = locked(&self.inner);
        if !inner.committed.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        inner.staged.insert(id, StagedOp::Remove);
        Ok(())
    }

    async fn save(&self) -> Result<(), RepositoryError> {
        let mut inner = locked(&self.inner);
        let staged: Vec<(i64, StagedOp)> = inner.staged.drain().collect();
        for (id, op) in staged {
            match op {
                StagedOp::Upsert(camera) => {
                    inner.committed.insert(id, camera);
                }
                StagedOp::Remove => {
                    inner.committed.remove(&id);
                }
            }
        }
        Ok(())
    }
}

/// In-memory location lookup.
#[derive(Default)]
pub struct InMemoryLocationRepository {
    locations: Mutex<HashMap<i64, Location>>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: Location) {
        locked(&self.locations).insert(location.id, location);
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Location>, RepositoryError> {
        Ok(locked(&self.locations).get(&id).cloned())
    }
}

/// In-memory audit trail.
#[derive(Default)]
pub struct InMemoryAuditLogStore {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries. Test helper.
    pub fn entries(&self) -> Vec<AuditEntry> {
        locked(&self.entries).clone()
    }
}

#[async_trait]
impl AuditLogStore for InMemoryAuditLogStore {
    async fn has_entries(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<bool, RepositoryError> {
        Ok(locked(&self.entries)
            .iter()
            .any(|e| e.entity_type == entity_type && e.entity_id == entity_id))
    }

    async fn record(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        locked(&self.entries).push(entry);
        Ok(())
    }
}

/// In-memory archive with a scriptable failure mode for the
/// archival-is-fatal tests.
#[derive(Default)]
pub struct InMemoryCameraArchive {
    records: Mutex<Vec<CameraArchiveRecord>>,
    failing: AtomicBool,
}

impl InMemoryCameraArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an archive whose writes always fail.
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failing: AtomicBool::new(true),
        }
    }

    /// All archived snapshots. Test helper.
    pub fn records(&self) -> Vec<CameraArchiveRecord> {
        locked(&self.records).clone()
    }
}

#[async_trait]
impl CameraArchive for InMemoryCameraArchive {
    async fn archive(&self, record: CameraArchiveRecord) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage(
                "archive storage unavailable".to_string(),
            ));
        }
        locked(&self.records).push(record);
        Ok(())
    }
}

/// In-memory configuration reference index.
#[derive(Default)]
pub struct InMemoryConfigurationReferenceStore {
    referenced: Mutex<HashSet<i64>>,
}

impl InMemoryConfigurationReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_reference(&self, camera_id: i64) {
        locked(&self.referenced).insert(camera_id);
    }
}

#[async_trait]
impl ConfigurationReferenceStore for InMemoryConfigurationReferenceStore {
    async fn has_references(&self, camera_id: i64) -> Result<bool, RepositoryError> {
        Ok(locked(&self.referenced).contains(&camera_id))
    }
}

/// In-memory user display-name directory.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    names: Mutex<HashMap<Uuid, String>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: Uuid, display_name: impl Into<String>) {
        locked(&self.names).insert(user_id, display_name.into());
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, RepositoryError> {
        Ok(locked(&self.names).get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::camera::{CameraStatus, CameraType};
    use crate::models::CameraConfiguration;
    use chrono::Utc;

    fn sample_camera(name: &str, location_id: Option<i64>) -> Camera {
        Camera {
            id: 0,
            name: name.to_string(),
            description: None,
            manufacturer: None,
            model: None,
            firmware_version: None,
            serial_number: None,
            camera_type: CameraType::Ip,
            connection_string: "rtsp://10.0.0.1/stream".to_string(),
            username: None,
            sealed_password: None,
            status: CameraStatus::Inactive,
            priority: 0,
            enable_facial_recognition: false,
            configuration_json: CameraConfiguration::default().to_json().unwrap(),
            metadata: None,
            location_id,
            created_by: Uuid::nil(),
            created_on: Utc::now(),
            modified_by: None,
            modified_on: None,
            is_deleted: false,
            last_health_check_at: None,
            last_online_at: None,
            consecutive_failures: 0,
            row_version: 0,
        }
    }

    #[tokio::test]
    async fn test_staged_add_invisible_until_save() {
        let repo = InMemoryCameraRepository::new();
        let added = repo.add(sample_camera("Cam", None)).await.unwrap();

        assert!(repo.find_by_id(added.id).await.unwrap().is_none());
        repo.save().await.unwrap();
        assert!(repo.find_by_id(added.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_name_lookup_is_case_insensitive_and_trimmed() {
        let repo = InMemoryCameraRepository::new();
        repo.add(sample_camera("Lobby Cam", Some(1))).await.unwrap();
        repo.save().await.unwrap();

        let found = repo
            .find_by_name_and_location("  lobby cam  ", Some(1))
            .await
            .unwrap();
        assert!(found.is_some());

        let other_location = repo
            .find_by_name_and_location("lobby cam", Some(2))
            .await
            .unwrap();
        assert!(other_location.is_none());
    }

    #[tokio::test]
    async fn test_update_detects_stale_version() {
        let repo = InMemoryCameraRepository::new();
        let added = repo.add(sample_camera("Cam", None)).await.unwrap();
        repo.save().await.unwrap();

        let mut stale = repo.find_by_id(added.id).await.unwrap().unwrap();

        // A concurrent writer commits first.
        let fresh = repo.find_by_id(added.id).await.unwrap().unwrap();
        repo.update(fresh).await.unwrap();
        repo.save().await.unwrap();

        stale.name = "Renamed".to_string();
        assert!(matches!(
            repo.update(stale).await,
            Err(RepositoryError::Conflict)
        ));
    }

    #[tokio::test]
    async fn test_remove_commits_on_save() {
        let repo = InMemoryCameraRepository::new();
        let added = repo.add(sample_camera("Cam", None)).await.unwrap();
        repo.save().await.unwrap();

        repo.remove(added.id).await.unwrap();
        assert!(repo.find_by_id(added.id).await.unwrap().is_some());
        repo.save().await.unwrap();
        assert!(repo.find_by_id(added.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failing_archive() {
        let archive = InMemoryCameraArchive::failing();
        let camera = sample_camera("Cam", None);
        let record = CameraArchiveRecord::snapshot(&camera, Uuid::nil(), None);
        assert!(archive.archive(record).await.is_err());
        assert!(archive.records().is_empty());
    }
}
