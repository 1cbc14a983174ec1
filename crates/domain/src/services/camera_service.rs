//! Camera service boundary: connectivity, streaming, recognition pipelines,
//! and the cleanup hooks the lifecycle orchestrator calls around deletion.
//!
//! Real implementations talk to the video gateway; [`MockCameraService`] logs
//! and answers from scripted in-memory state.

use crate::models::{CameraStatus, ConnectionTestResult, HealthCheckResult, StreamInfo};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors from the camera service boundary.
#[derive(Debug, Error)]
pub enum CameraServiceError {
    #[error("Camera {0} is unreachable: {1}")]
    Unreachable(i64, String),

    #[error("No active stream for camera {0}")]
    NoActiveStream(i64),

    #[error("Cleanup step failed: {0}")]
    Cleanup(String),

    #[error("Camera service error: {0}")]
    Other(String),
}

/// Operations provided by the camera runtime.
///
/// Status-affecting results flow back through [`HealthCheckResult`] and
/// [`ConnectionTestResult`]; the orchestrator owns the persisted row and
/// applies them there.
#[async_trait::async_trait]
pub trait CameraService: Send + Sync {
    /// Attempts a connection against the camera endpoint.
    async fn test_connection(&self, camera_id: i64) -> ConnectionTestResult;

    /// Last known connection status, without probing.
    async fn connection_status(&self, camera_id: i64) -> CameraStatus;

    async fn start_stream(&self, camera_id: i64) -> Result<StreamInfo, CameraServiceError>;

    async fn stop_stream(&self, camera_id: i64) -> Result<(), CameraServiceError>;

    async fn is_streaming(&self, camera_id: i64) -> bool;

    async fn stream_info(&self, camera_id: i64) -> Option<StreamInfo>;

    async fn has_active_facial_recognition(&self, camera_id: i64) -> bool;

    async fn start_facial_recognition(&self, camera_id: i64) -> Result<(), CameraServiceError>;

    async fn stop_facial_recognition(&self, camera_id: i64) -> Result<(), CameraServiceError>;

    /// Cancels any queued or running recognition tasks. Called during
    /// deletion cleanup.
    async fn cancel_facial_recognition_tasks(
        &self,
        camera_id: i64,
    ) -> Result<(), CameraServiceError>;

    /// Probes the camera and produces a scored result.
    async fn perform_health_check(&self, camera_id: i64, camera_name: &str) -> HealthCheckResult;

    /// Health-checks every given camera, one result per camera.
    async fn perform_health_check_all(
        &self,
        cameras: &[(i64, String)],
    ) -> Vec<HealthCheckResult>;

    /// Pushes a status change into the runtime (monitoring dashboards etc.),
    /// with the triggering error and user when known.
    async fn update_camera_status(
        &self,
        camera_id: i64,
        status: CameraStatus,
        error: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<(), CameraServiceError>;

    async fn clear_cache(&self, camera_id: i64) -> Result<(), CameraServiceError>;

    async fn clear_all_caches(&self) -> Result<(), CameraServiceError>;

    /// Cleans recordings, thumbnails and temp files for the camera.
    /// `permanent` distinguishes destroying the data from detaching it.
    async fn cleanup_file_system_resources(
        &self,
        camera_id: i64,
        permanent: bool,
    ) -> Result<(), CameraServiceError>;

    /// Fans out a deletion notice to interested subsystems, flagged soft or
    /// permanent.
    async fn notify_camera_deletion(
        &self,
        camera_id: i64,
        permanent: bool,
    ) -> Result<(), CameraServiceError>;

    /// Updates monitoring dashboards and alert rules; `removed` is true when
    /// the camera row was destroyed rather than soft-deleted.
    async fn update_monitoring_systems(
        &self,
        camera_id: i64,
        removed: bool,
    ) -> Result<(), CameraServiceError>;

    /// Grabs a single frame as an encoded image.
    async fn capture_frame(&self, camera_id: i64) -> Result<Vec<u8>, CameraServiceError>;

    async fn start_frame_capture(&self, camera_id: i64) -> Result<(), CameraServiceError>;

    async fn stop_frame_capture(&self, camera_id: i64) -> Result<(), CameraServiceError>;
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct MockState {
    streaming: HashSet<i64>,
    recognizing: HashSet<i64>,
    capturing: HashSet<i64>,
    statuses: HashMap<i64, CameraStatus>,
    calls: Vec<String>,
}

/// Mock camera service for development and testing.
///
/// Streams and recognition pipelines are plain in-memory sets; health checks
/// always pass unless a camera is scripted unreachable.
#[derive(Debug, Default)]
pub struct MockCameraService {
    state: Mutex<MockState>,
    unreachable: Mutex<HashSet<i64>>,
    fail_cleanup: AtomicBool,
}

impl MockCameraService {
    /// Create a new mock camera service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose cleanup hooks all fail.
    pub fn failing_cleanup() -> Self {
        let service = Self::default();
        service.fail_cleanup.store(true, Ordering::SeqCst);
        service
    }

    /// Scripts the camera as unreachable: connection tests and health checks
    /// against it fail.
    pub fn set_unreachable(&self, camera_id: i64) {
        locked(&self.unreachable).insert(camera_id);
    }

    /// Pre-seeds an active stream, as if `start_stream` had been called.
    pub fn set_streaming(&self, camera_id: i64) {
        locked(&self.state).streaming.insert(camera_id);
    }

    /// Pre-seeds an active recognition pipeline.
    pub fn set_recognizing(&self, camera_id: i64) {
        locked(&self.state).recognizing.insert(camera_id);
    }

    /// Names of every operation invoked, in order. Test helper.
    pub fn calls(&self) -> Vec<String> {
        locked(&self.state).calls.clone()
    }

    /// Whether a frame-capture session is running. Test helper.
    pub fn is_capturing(&self, camera_id: i64) -> bool {
        locked(&self.state).capturing.contains(&camera_id)
    }

    fn record(&self, call: impl Into<String>) {
        locked(&self.state).calls.push(call.into());
    }

    fn is_unreachable(&self, camera_id: i64) -> bool {
        locked(&self.unreachable).contains(&camera_id)
    }

    fn cleanup_result(&self, step: &str, camera_id: i64) -> Result<(), CameraServiceError> {
        if self.fail_cleanup.load(Ordering::SeqCst) {
            tracing::warn!(camera_id = %camera_id, step = %step, "Mock cleanup simulating failure");
            return Err(CameraServiceError::Cleanup(format!(
                "{} failed for camera {}",
                step, camera_id
            )));
        }
        tracing::info!(camera_id = %camera_id, step = %step, "Mock: cleanup step completed");
        Ok(())
    }

    fn mock_stream_info(camera_id: i64) -> StreamInfo {
        StreamInfo {
            camera_id,
            is_streaming: true,
            stream_url: format!("rtsp://mock-gateway/cameras/{}/live", camera_id),
            frame_rate: 25,
            resolution: "1920x1080".to_string(),
            active_connections: 1,
            started_at: Utc::now(),
            quality_score: 95,
            metadata: HashMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl CameraService for MockCameraService {
    async fn test_connection(&self, camera_id: i64) -> ConnectionTestResult {
        self.record(format!("test_connection({})", camera_id));
        if self.is_unreachable(camera_id) {
            tracing::warn!(camera_id = %camera_id, "Mock: connection test failed");
            return ConnectionTestResult::failed("connection refused");
        }
        tracing::info!(camera_id = %camera_id, "Mock: connection test passed");
        ConnectionTestResult::succeeded(42)
    }

    async fn connection_status(&self, camera_id: i64) -> CameraStatus {
        locked(&self.state)
            .statuses
            .get(&camera_id)
            .copied()
            .unwrap_or(CameraStatus::Inactive)
    }

    async fn start_stream(&self, camera_id: i64) -> Result<StreamInfo, CameraServiceError> {
        self.record(format!("start_stream({})", camera_id));
        if self.is_unreachable(camera_id) {
            return Err(CameraServiceError::Unreachable(
                camera_id,
                "connection refused".to_string(),
            ));
        }
        locked(&self.state).streaming.insert(camera_id);
        Ok(Self::mock_stream_info(camera_id))
    }

    async fn stop_stream(&self, camera_id: i64) -> Result<(), CameraServiceError> {
        self.record(format!("stop_stream({})", camera_id));
        locked(&self.state).streaming.remove(&camera_id);
        Ok(())
    }

    async fn is_streaming(&self, camera_id: i64) -> bool {
        locked(&self.state).streaming.contains(&camera_id)
    }

    async fn stream_info(&self, camera_id: i64) -> Option<StreamInfo> {
        locked(&self.state)
            .streaming
            .contains(&camera_id)
            .then(|| Self::mock_stream_info(camera_id))
    }

    async fn has_active_facial_recognition(&self, camera_id: i64) -> bool {
        locked(&self.state).recognizing.contains(&camera_id)
    }

    async fn start_facial_recognition(&self, camera_id: i64) -> Result<(), CameraServiceError> {
        self.record(format!("start_facial_recognition({})", camera_id));
        locked(&self.state).recognizing.insert(camera_id);
        Ok(())
    }

    async fn stop_facial_recognition(&self, camera_id: i64) -> Result<(), CameraServiceError> {
        self.record(format!("stop_facial_recognition({})", camera_id));
        locked(&self.state).recognizing.remove(&camera_id);
        Ok(())
    }

    async fn cancel_facial_recognition_tasks(
        &self,
        camera_id: i64,
    ) -> Result<(), CameraServiceError> {
        self.record(format!("cancel_facial_recognition_tasks({})", camera_id));
        locked(&self.state).recognizing.remove(&camera_id);
        self.cleanup_result("cancel_facial_recognition_tasks", camera_id)
    }

    async fn perform_health_check(&self, camera_id: i64, camera_name: &str) -> HealthCheckResult {
        self.record(format!("perform_health_check({})", camera_id));
        if self.is_unreachable(camera_id) {
            HealthCheckResult::unhealthy(camera_id, camera_name, "connection refused")
        } else {
            HealthCheckResult::healthy(camera_id, camera_name, 42)
        }
    }

    async fn perform_health_check_all(
        &self,
        cameras: &[(i64, String)],
    ) -> Vec<HealthCheckResult> {
        let mut results = Vec::with_capacity(cameras.len());
        for (id, name) in cameras {
            results.push(self.perform_health_check(*id, name).await);
        }
        results
    }

    async fn update_camera_status(
        &self,
        camera_id: i64,
        status: CameraStatus,
        error: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<(), CameraServiceError> {
        self.record(format!(
            "update_camera_status({}, {}, {}, {})",
            camera_id,
            status,
            error.unwrap_or("-"),
            user_id.map(|u| u.to_string()).unwrap_or_else(|| "-".to_string()),
        ));
        locked(&self.state).statuses.insert(camera_id, status);
        Ok(())
    }

    async fn clear_cache(&self, camera_id: i64) -> Result<(), CameraServiceError> {
        self.record(format!("clear_cache({})", camera_id));
        self.cleanup_result("clear_cache", camera_id)
    }

    async fn clear_all_caches(&self) -> Result<(), CameraServiceError> {
        self.record("clear_all_caches".to_string());
        Ok(())
    }

    async fn cleanup_file_system_resources(
        &self,
        camera_id: i64,
        permanent: bool,
    ) -> Result<(), CameraServiceError> {
        self.record(format!(
            "cleanup_file_system_resources({}, {})",
            camera_id, permanent
        ));
        self.cleanup_result("cleanup_file_system_resources", camera_id)
    }

    async fn notify_camera_deletion(
        &self,
        camera_id: i64,
        permanent: bool,
    ) -> Result<(), CameraServiceError> {
        self.record(format!(
            "notify_camera_deletion({}, {})",
            camera_id, permanent
        ));
        self.cleanup_result("notify_camera_deletion", camera_id)
    }

    async fn update_monitoring_systems(
        &self,
        camera_id: i64,
        removed: bool,
    ) -> Result<(), CameraServiceError> {
        self.record(format!(
            "update_monitoring_systems({}, {})",
            camera_id, removed
        ));
        self.cleanup_result("update_monitoring_systems", camera_id)
    }

    async fn capture_frame(&self, camera_id: i64) -> Result<Vec<u8>, CameraServiceError> {
        self.record(format!("capture_frame({})", camera_id));
        if self.is_unreachable(camera_id) {
            return Err(CameraServiceError::Unreachable(
                camera_id,
                "connection refused".to_string(),
            ));
        }
        // Minimal JPEG marker so consumers can sniff the format.
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }

    async fn start_frame_capture(&self, camera_id: i64) -> Result<(), CameraServiceError> {
        self.record(format!("start_frame_capture({})", camera_id));
        locked(&self.state).capturing.insert(camera_id);
        Ok(())
    }

    async fn stop_frame_capture(&self, camera_id: i64) -> Result<(), CameraServiceError> {
        self.record(format!("stop_frame_capture({})", camera_id));
        locked(&self.state).capturing.remove(&camera_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_stream_lifecycle() {
        let service = MockCameraService::new();
        assert!(!service.is_streaming(1).await);

        let info = service.start_stream(1).await.unwrap();
        assert!(info.is_streaming);
        assert_eq!(info.camera_id, 1);
        assert!(service.is_streaming(1).await);
        assert!(service.stream_info(1).await.is_some());

        service.stop_stream(1).await.unwrap();
        assert!(!service.is_streaming(1).await);
        assert!(service.stream_info(1).await.is_none());
    }

    #[tokio::test]
    async fn test_mock_unreachable_camera() {
        let service = MockCameraService::new();
        service.set_unreachable(5);

        let test = service.test_connection(5).await;
        assert!(!test.success);
        assert_eq!(test.status, CameraStatus::Error);

        let check = service.perform_health_check(5, "Dock Cam").await;
        assert!(!check.is_healthy);
        assert_eq!(check.status, CameraStatus::Error);

        assert!(service.start_stream(5).await.is_err());
        assert!(service.capture_frame(5).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_health_check_passes_by_default() {
        let service = MockCameraService::new();
        let check = service.perform_health_check(1, "Lobby Cam").await;
        assert!(check.is_healthy);
        assert_eq!(check.health_score, 100);
        assert_eq!(check.camera_name, "Lobby Cam");
    }

    #[tokio::test]
    async fn test_mock_health_check_all() {
        let service = MockCameraService::new();
        service.set_unreachable(2);

        let cameras = vec![(1, "A".to_string()), (2, "B".to_string())];
        let results = service.perform_health_check_all(&cameras).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_healthy);
        assert!(!results[1].is_healthy);
    }

    #[tokio::test]
    async fn test_failing_cleanup_mock() {
        let service = MockCameraService::failing_cleanup();
        assert!(service.clear_cache(1).await.is_err());
        assert!(service.cleanup_file_system_resources(1, true).await.is_err());
        assert!(service.notify_camera_deletion(1, false).await.is_err());
        assert!(service.update_monitoring_systems(1, true).await.is_err());
        // Streaming still works; only cleanup hooks fail.
        assert!(service.start_stream(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_deletion_hooks_record_their_flags() {
        let service = MockCameraService::new();
        service.cleanup_file_system_resources(7, true).await.unwrap();
        service.notify_camera_deletion(7, false).await.unwrap();
        service.update_monitoring_systems(7, true).await.unwrap();

        let calls = service.calls();
        assert_eq!(
            calls,
            vec![
                "cleanup_file_system_resources(7, true)",
                "notify_camera_deletion(7, false)",
                "update_monitoring_systems(7, true)",
            ]
        );
    }

    #[tokio::test]
    async fn test_recognition_pipeline_state() {
        let service = MockCameraService::new();
        assert!(!service.has_active_facial_recognition(1).await);

        service.start_facial_recognition(1).await.unwrap();
        assert!(service.has_active_facial_recognition(1).await);

        service.cancel_facial_recognition_tasks(1).await.unwrap();
        assert!(!service.has_active_facial_recognition(1).await);
    }

    #[tokio::test]
    async fn test_frame_capture_state() {
        let service = MockCameraService::new();
        assert!(!service.is_capturing(4));
        service.start_frame_capture(4).await.unwrap();
        assert!(service.is_capturing(4));
        service.stop_frame_capture(4).await.unwrap();
        assert!(!service.is_capturing(4));
    }

    #[tokio::test]
    async fn test_call_recording() {
        let service = MockCameraService::new();
        service.start_stream(3).await.unwrap();
        service.stop_stream(3).await.unwrap();

        let calls = service.calls();
        assert_eq!(calls, vec!["start_stream(3)", "stop_stream(3)"]);
    }
}
