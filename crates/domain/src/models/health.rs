//! Connection and health-check result models.
//!
//! These are transient values produced by the camera service and consumed by
//! the lifecycle orchestrator to update camera rows; they are never persisted
//! as entities themselves.

use crate::models::camera::CameraStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score below which a camera is considered unhealthy.
const HEALTHY_THRESHOLD: u8 = 70;

/// Cap on the cumulative failure-count penalty.
const MAX_FAILURE_PENALTY: i32 = 30;

/// Derives a 0-100 health score and a healthy/unhealthy verdict from raw
/// signals.
///
/// Starts at 100 and subtracts a status penalty, a failure-count penalty of
/// `min(failure_count * 5, 30)`, and a latency penalty. Latency bands are
/// mutually exclusive, largest applicable: (1000,5000] -> 10,
/// (5000,10000] -> 20, >10000 -> 30.
pub fn health_score(status: CameraStatus, failure_count: i32, response_time_ms: i64) -> (u8, bool) {
    let mut score: i32 = 100;

    score -= match status {
        CameraStatus::Active => 0,
        CameraStatus::Connecting => 20,
        CameraStatus::Maintenance => 30,
        CameraStatus::Disconnected => 40,
        CameraStatus::Error => 60,
        CameraStatus::Inactive => 80,
    };

    score -= (failure_count.max(0).saturating_mul(5)).min(MAX_FAILURE_PENALTY);

    score -= if response_time_ms > 10_000 {
        30
    } else if response_time_ms > 5_000 {
        20
    } else if response_time_ms > 1_000 {
        10
    } else {
        0
    };

    let score = score.clamp(0, 100) as u8;
    (score, score >= HEALTHY_THRESHOLD)
}

/// Outcome of a single connection attempt against a camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResult {
    pub success: bool,
    pub status: CameraStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub response_time_ms: i64,
    pub tested_at: DateTime<Utc>,
    #[serde(default)]
    pub details: HashMap<String, String>,
}

impl ConnectionTestResult {
    /// Builds a successful result with the given latency.
    pub fn succeeded(response_time_ms: i64) -> Self {
        Self {
            success: true,
            status: CameraStatus::Active,
            error_message: None,
            response_time_ms,
            tested_at: Utc::now(),
            details: HashMap::new(),
        }
    }

    /// Builds a failed result carrying the vendor error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status: CameraStatus::Error,
            error_message: Some(error.into()),
            response_time_ms: 0,
            tested_at: Utc::now(),
            details: HashMap::new(),
        }
    }
}

/// Snapshot of a live streaming session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    pub camera_id: i64,
    pub is_streaming: bool,
    pub stream_url: String,
    pub frame_rate: i32,
    pub resolution: String,
    pub active_connections: i32,
    pub started_at: DateTime<Utc>,
    pub quality_score: i32,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StreamInfo {
    /// How long the stream has been running.
    pub fn duration(&self) -> Duration {
        Utc::now() - self.started_at
    }
}

/// Outcome of a health check against a single camera.
///
/// Always carries a computed health score; the constructors run the scoring
/// step, so a result is never exposed unscored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub camera_id: i64,
    pub camera_name: String,
    pub is_healthy: bool,
    pub status: CameraStatus,
    pub previous_status: CameraStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub response_time_ms: i64,
    pub checked_at: DateTime<Utc>,
    pub failure_count: i32,
    pub health_score: u8,
}

impl HealthCheckResult {
    /// Builds a fully scored result from raw signals.
    pub fn new(
        camera_id: i64,
        camera_name: impl Into<String>,
        status: CameraStatus,
        previous_status: CameraStatus,
        error_message: Option<String>,
        response_time_ms: i64,
        failure_count: i32,
    ) -> Self {
        let (score, is_healthy) = health_score(status, failure_count, response_time_ms);
        Self {
            camera_id,
            camera_name: camera_name.into(),
            is_healthy,
            status,
            previous_status,
            error_message,
            response_time_ms,
            checked_at: Utc::now(),
            failure_count,
            health_score: score,
        }
    }

    /// Convenience constructor for a passing check: status `Active`, failure
    /// count zeroed, scored immediately.
    pub fn healthy(camera_id: i64, camera_name: impl Into<String>, response_time_ms: i64) -> Self {
        Self::new(
            camera_id,
            camera_name,
            CameraStatus::Active,
            CameraStatus::Active,
            None,
            response_time_ms,
            0,
        )
    }

    /// Convenience constructor for a failing check: status `Error`, failure
    /// count 1, scored immediately.
    pub fn unhealthy(camera_id: i64, camera_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            camera_id,
            camera_name,
            CameraStatus::Error,
            CameraStatus::Error,
            Some(error.into()),
            0,
            1,
        )
    }

    /// Overrides the previous status observed before this check.
    pub fn with_previous_status(mut self, previous: CameraStatus) -> Self {
        self.previous_status = previous;
        self
    }

    /// The camera came back: previously `Error`, now `Active`.
    pub fn is_recovery(&self) -> bool {
        self.previous_status == CameraStatus::Error && self.status == CameraStatus::Active
    }

    /// The camera just went down: previously `Active`, now `Error`.
    pub fn is_new_failure(&self) -> bool {
        self.previous_status == CameraStatus::Active && self.status == CameraStatus::Error
    }
}
