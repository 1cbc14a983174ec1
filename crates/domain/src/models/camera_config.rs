//! Camera configuration value object.
//!
//! The configuration is persisted on the camera row as a camelCase JSON blob.
//! Creation and update use different fallback policies on purpose: creation
//! backfills missing fields from the global default template, while update
//! falls back to the previously stored value. Zero or negative numeric
//! overrides count as "unset" in both paths.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Operating parameters for a camera, with validated bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraConfiguration {
    /// Horizontal resolution in pixels; `None` means "Auto".
    #[validate(custom(function = "shared::validation::validate_positive"))]
    pub resolution_width: Option<i32>,

    /// Vertical resolution in pixels; `None` means "Auto".
    #[validate(custom(function = "shared::validation::validate_positive"))]
    pub resolution_height: Option<i32>,

    #[validate(custom(function = "shared::validation::validate_frame_rate"))]
    pub frame_rate: i32,

    #[validate(custom(function = "shared::validation::validate_quality"))]
    pub quality: i32,

    #[validate(custom(function = "shared::validation::validate_positive"))]
    pub max_connections: i32,

    #[validate(custom(function = "shared::validation::validate_connection_timeout"))]
    pub connection_timeout_secs: i32,

    #[validate(custom(function = "shared::validation::validate_retry_interval"))]
    pub retry_interval_secs: i32,

    #[validate(custom(function = "shared::validation::validate_retry_attempts"))]
    pub max_retry_attempts: i32,

    pub enable_motion_detection: bool,

    /// Required whenever motion detection is enabled.
    #[validate(custom(function = "shared::validation::validate_percentage"))]
    pub motion_sensitivity: Option<i32>,

    #[validate(custom(function = "shared::validation::validate_recording_duration"))]
    pub recording_duration_minutes: i32,

    pub enable_facial_recognition: bool,

    /// Required whenever facial recognition is enabled.
    #[validate(custom(function = "shared::validation::validate_percentage"))]
    pub facial_recognition_threshold: Option<i32>,

    /// Free-form vendor-specific payload, carried through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_configuration: Option<serde_json::Value>,
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            resolution_width: None,
            resolution_height: None,
            frame_rate: 30,
            quality: 80,
            max_connections: 5,
            connection_timeout_secs: 30,
            retry_interval_secs: 60,
            max_retry_attempts: 3,
            enable_motion_detection: false,
            motion_sensitivity: None,
            recording_duration_minutes: 0,
            enable_facial_recognition: false,
            facial_recognition_threshold: None,
            extended_configuration: None,
        }
    }
}

/// Partial configuration carried on create/update requests.
///
/// Every field is optional; how an absent field resolves depends on whether
/// the request is a creation (global default) or an update (existing value).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraConfigurationUpdate {
    pub resolution_width: Option<i32>,
    pub resolution_height: Option<i32>,
    pub frame_rate: Option<i32>,
    pub quality: Option<i32>,
    pub max_connections: Option<i32>,
    pub connection_timeout_secs: Option<i32>,
    pub retry_interval_secs: Option<i32>,
    pub max_retry_attempts: Option<i32>,
    pub enable_motion_detection: Option<bool>,
    pub motion_sensitivity: Option<i32>,
    pub recording_duration_minutes: Option<i32>,
    pub enable_facial_recognition: Option<bool>,
    pub facial_recognition_threshold: Option<i32>,
    pub extended_configuration: Option<serde_json::Value>,
}

/// Picks an override when it is a usable positive number, otherwise the
/// fallback. Zero or negative overrides are treated as unset, not as zero.
fn numeric_or(value: Option<i32>, fallback: i32) -> i32 {
    match value {
        Some(v) if v > 0 => v,
        _ => fallback,
    }
}

fn optional_numeric_or(value: Option<i32>, fallback: Option<i32>) -> Option<i32> {
    match value {
        Some(v) if v > 0 => Some(v),
        _ => fallback,
    }
}

impl CameraConfiguration {
    /// Builds a configuration for camera creation.
    ///
    /// Missing or zero/negative numeric overrides fall back to the global
    /// default template.
    pub fn from_overrides(overrides: Option<&CameraConfigurationUpdate>) -> Self {
        let defaults = Self::default();
        let Some(o) = overrides else {
            return defaults;
        };

        Self {
            resolution_width: optional_numeric_or(o.resolution_width, defaults.resolution_width),
            resolution_height: optional_numeric_or(o.resolution_height, defaults.resolution_height),
            frame_rate: numeric_or(o.frame_rate, defaults.frame_rate),
            quality: numeric_or(o.quality, defaults.quality),
            max_connections: numeric_or(o.max_connections, defaults.max_connections),
            connection_timeout_secs: numeric_or(
                o.connection_timeout_secs,
                defaults.connection_timeout_secs,
            ),
            retry_interval_secs: numeric_or(o.retry_interval_secs, defaults.retry_interval_secs),
            max_retry_attempts: numeric_or(o.max_retry_attempts, defaults.max_retry_attempts),
            enable_motion_detection: o
                .enable_motion_detection
                .unwrap_or(defaults.enable_motion_detection),
            motion_sensitivity: optional_numeric_or(
                o.motion_sensitivity,
                defaults.motion_sensitivity,
            ),
            recording_duration_minutes: numeric_or(
                o.recording_duration_minutes,
                defaults.recording_duration_minutes,
            ),
            enable_facial_recognition: o
                .enable_facial_recognition
                .unwrap_or(defaults.enable_facial_recognition),
            facial_recognition_threshold: optional_numeric_or(
                o.facial_recognition_threshold,
                defaults.facial_recognition_threshold,
            ),
            extended_configuration: o
                .extended_configuration
                .clone()
                .or(defaults.extended_configuration),
        }
    }

    /// Builds a configuration for camera update by merging overrides into the
    /// previously stored configuration.
    ///
    /// Missing or zero/negative numeric overrides fall back to the EXISTING
    /// stored value, never the global default. This asymmetry with
    /// [`from_overrides`](Self::from_overrides) is deliberate.
    pub fn merged_with(&self, overrides: &CameraConfigurationUpdate) -> Self {
        Self {
            resolution_width: optional_numeric_or(overrides.resolution_width, self.resolution_width),
            resolution_height: optional_numeric_or(
                overrides.resolution_height,
                self.resolution_height,
            ),
            frame_rate: numeric_or(overrides.frame_rate, self.frame_rate),
            quality: numeric_or(overrides.quality, self.quality),
            max_connections: numeric_or(overrides.max_connections, self.max_connections),
            connection_timeout_secs: numeric_or(
                overrides.connection_timeout_secs,
                self.connection_timeout_secs,
            ),
            retry_interval_secs: numeric_or(
                overrides.retry_interval_secs,
                self.retry_interval_secs,
            ),
            max_retry_attempts: numeric_or(overrides.max_retry_attempts, self.max_retry_attempts),
            enable_motion_detection: overrides
                .enable_motion_detection
                .unwrap_or(self.enable_motion_detection),
            motion_sensitivity: optional_numeric_or(
                overrides.motion_sensitivity,
                self.motion_sensitivity,
            ),
            recording_duration_minutes: numeric_or(
                overrides.recording_duration_minutes,
                self.recording_duration_minutes,
            ),
            enable_facial_recognition: overrides
                .enable_facial_recognition
                .unwrap_or(self.enable_facial_recognition),
            facial_recognition_threshold: optional_numeric_or(
                overrides.facial_recognition_threshold,
                self.facial_recognition_threshold,
            ),
            extended_configuration: overrides
                .extended_configuration
                .clone()
                .or_else(|| self.extended_configuration.clone()),
        }
    }

    /// Validates every bound and cross-field rule, aggregating ALL violations
    /// instead of stopping at the first.
    pub fn validate_all(&self) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();

        if let Err(errors) = self.validate() {
            for (field, field_errors) in errors.field_errors() {
                for error in field_errors {
                    let message = error
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    violations.push(format!("{}: {}", field, message));
                }
            }
        }

        if self.enable_motion_detection && self.motion_sensitivity.is_none() {
            violations.push(
                "motionSensitivity: Motion sensitivity is required when motion detection is enabled"
                    .to_string(),
            );
        }

        if self.enable_facial_recognition && self.facial_recognition_threshold.is_none() {
            violations.push(
                "facialRecognitionThreshold: Facial recognition threshold is required when facial recognition is enabled"
                    .to_string(),
            );
        }

        if violations.is_empty() {
            Ok(())
        } else {
            violations.sort();
            Err(violations)
        }
    }

    /// Parses a stored configuration blob.
    ///
    /// Unknown fields are ignored; a blob that fails to deserialize yields
    /// `None` ("use defaults") rather than an error.
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    /// Serializes the configuration for storage on the camera row.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Human-readable resolution, e.g. `1920x1080`, or `Auto` when unset.
    pub fn resolution_display(&self) -> String {
        match (self.resolution_width, self.resolution_height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "Auto".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_template() {
        let config = CameraConfiguration::default();
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.quality, 80);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.connection_timeout_secs, 30);
        assert_eq!(config.retry_interval_secs, 60);
        assert_eq!(config.max_retry_attempts, 3);
        assert!(!config.enable_motion_detection);
        assert!(!config.enable_facial_recognition);
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_from_overrides_none_yields_defaults() {
        assert_eq!(
            CameraConfiguration::from_overrides(None),
            CameraConfiguration::default()
        );
    }

    #[test]
    fn test_from_overrides_missing_fields_use_defaults() {
        let overrides = CameraConfigurationUpdate {
            frame_rate: Some(15),
            ..Default::default()
        };
        let config = CameraConfiguration::from_overrides(Some(&overrides));
        assert_eq!(config.frame_rate, 15);
        assert_eq!(config.connection_timeout_secs, 30);
        assert_eq!(config.max_retry_attempts, 3);
    }

    #[test]
    fn test_from_overrides_zero_or_negative_treated_as_unset() {
        let overrides = CameraConfigurationUpdate {
            frame_rate: Some(0),
            max_connections: Some(-2),
            ..Default::default()
        };
        let config = CameraConfiguration::from_overrides(Some(&overrides));
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_merged_with_falls_back_to_existing_not_default() {
        let existing = CameraConfiguration {
            frame_rate: 12,
            connection_timeout_secs: 120,
            ..CameraConfiguration::default()
        };
        let overrides = CameraConfigurationUpdate {
            quality: Some(55),
            ..Default::default()
        };

        let merged = existing.merged_with(&overrides);
        assert_eq!(merged.quality, 55);
        // Unset fields retain the stored value, not the global default.
        assert_eq!(merged.frame_rate, 12);
        assert_eq!(merged.connection_timeout_secs, 120);
    }

    #[test]
    fn test_merged_with_zero_falls_back_to_existing() {
        let existing = CameraConfiguration {
            frame_rate: 12,
            ..CameraConfiguration::default()
        };
        let overrides = CameraConfigurationUpdate {
            frame_rate: Some(0),
            ..Default::default()
        };
        assert_eq!(existing.merged_with(&overrides).frame_rate, 12);
    }

    #[test]
    fn test_merge_policy_asymmetry() {
        // The same unset field resolves differently on create vs update.
        let overrides = CameraConfigurationUpdate::default();

        let created = CameraConfiguration::from_overrides(Some(&overrides));
        assert_eq!(created.retry_interval_secs, 60);

        let existing = CameraConfiguration {
            retry_interval_secs: 90,
            ..CameraConfiguration::default()
        };
        let updated = existing.merged_with(&overrides);
        assert_eq!(updated.retry_interval_secs, 90);
    }

    #[test]
    fn test_merged_with_toggle_retained_when_absent() {
        let existing = CameraConfiguration {
            enable_motion_detection: true,
            motion_sensitivity: Some(40),
            ..CameraConfiguration::default()
        };
        let merged = existing.merged_with(&CameraConfigurationUpdate::default());
        assert!(merged.enable_motion_detection);
        assert_eq!(merged.motion_sensitivity, Some(40));
    }

    #[test]
    fn test_validate_motion_detection_requires_sensitivity() {
        let config = CameraConfiguration {
            enable_motion_detection: true,
            motion_sensitivity: None,
            ..CameraConfiguration::default()
        };
        let violations = config.validate_all().unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.contains("Motion sensitivity is required")));
    }

    #[test]
    fn test_validate_facial_recognition_requires_threshold() {
        let config = CameraConfiguration {
            enable_facial_recognition: true,
            facial_recognition_threshold: None,
            ..CameraConfiguration::default()
        };
        let violations = config.validate_all().unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.contains("Facial recognition threshold is required")));
    }

    #[test]
    fn test_validate_aggregates_all_violations() {
        let config = CameraConfiguration {
            frame_rate: 0,
            quality: 150,
            connection_timeout_secs: 2,
            enable_motion_detection: true,
            motion_sensitivity: None,
            ..CameraConfiguration::default()
        };
        let violations = config.validate_all().unwrap_err();
        assert!(violations.len() >= 4);
        assert!(violations.iter().any(|v| v.contains("Frame rate")));
        assert!(violations.iter().any(|v| v.contains("Quality")));
        assert!(violations.iter().any(|v| v.contains("Connection timeout")));
        assert!(violations
            .iter()
            .any(|v| v.contains("Motion sensitivity is required")));
    }

    #[test]
    fn test_validate_range_on_provided_parameters() {
        let config = CameraConfiguration {
            enable_motion_detection: true,
            motion_sensitivity: Some(150),
            ..CameraConfiguration::default()
        };
        let violations = config.validate_all().unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.starts_with("motion_sensitivity")));
    }

    #[test]
    fn test_json_round_trip_is_camel_case() {
        let config = CameraConfiguration {
            resolution_width: Some(1920),
            resolution_height: Some(1080),
            ..CameraConfiguration::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("resolutionWidth"));
        assert!(json.contains("connectionTimeoutSecs"));
        assert!(!json.contains("resolution_width"));
        assert_eq!(CameraConfiguration::from_json(&json), Some(config));
    }

    #[test]
    fn test_from_json_ignores_unknown_fields() {
        let blob = json!({
            "frameRate": 25,
            "someVendorField": {"a": 1}
        })
        .to_string();
        let config = CameraConfiguration::from_json(&blob).unwrap();
        assert_eq!(config.frame_rate, 25);
        assert_eq!(config.quality, 80);
    }

    #[test]
    fn test_from_json_failure_yields_none() {
        assert_eq!(CameraConfiguration::from_json("not json at all"), None);
        assert_eq!(CameraConfiguration::from_json("[1,2,3]"), None);
    }

    #[test]
    fn test_resolution_display() {
        let mut config = CameraConfiguration::default();
        assert_eq!(config.resolution_display(), "Auto");

        config.resolution_width = Some(1920);
        assert_eq!(config.resolution_display(), "Auto");

        config.resolution_height = Some(1080);
        assert_eq!(config.resolution_display(), "1920x1080");
    }

    #[test]
    fn test_extended_configuration_carried_through() {
        let overrides = CameraConfigurationUpdate {
            extended_configuration: Some(json!({"ptzPresets": [1, 2, 3]})),
            ..Default::default()
        };
        let config = CameraConfiguration::from_overrides(Some(&overrides));
        assert!(config.extended_configuration.is_some());

        let merged = config.merged_with(&CameraConfigurationUpdate::default());
        assert_eq!(
            merged.extended_configuration,
            Some(json!({"ptzPresets": [1, 2, 3]}))
        );
    }
}
