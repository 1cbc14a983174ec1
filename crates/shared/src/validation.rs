//! Common validation utilities for camera configuration bounds.

use validator::ValidationError;

/// Validates that a frame rate is within valid range (1 to 60 fps).
pub fn validate_frame_rate(rate: i32) -> Result<(), ValidationError> {
    if (1..=60).contains(&rate) {
        Ok(())
    } else {
        let mut err = ValidationError::new("frame_rate_range");
        err.message = Some("Frame rate must be between 1 and 60".into());
        Err(err)
    }
}

/// Validates that a quality value is within valid range (0 to 100).
pub fn validate_quality(quality: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&quality) {
        Ok(())
    } else {
        let mut err = ValidationError::new("quality_range");
        err.message = Some("Quality must be between 0 and 100".into());
        Err(err)
    }
}

/// Validates that a percentage value is within valid range (0 to 100).
///
/// Used for motion sensitivity and facial recognition thresholds.
pub fn validate_percentage(value: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("percentage_range");
        err.message = Some("Value must be between 0 and 100".into());
        Err(err)
    }
}

/// Validates that a connection timeout is within valid range (5 to 300 seconds).
pub fn validate_connection_timeout(secs: i32) -> Result<(), ValidationError> {
    if (5..=300).contains(&secs) {
        Ok(())
    } else {
        let mut err = ValidationError::new("connection_timeout_range");
        err.message = Some("Connection timeout must be between 5 and 300 seconds".into());
        Err(err)
    }
}

/// Validates that a retry interval is within valid range (5 to 300 seconds).
pub fn validate_retry_interval(secs: i32) -> Result<(), ValidationError> {
    if (5..=300).contains(&secs) {
        Ok(())
    } else {
        let mut err = ValidationError::new("retry_interval_range");
        err.message = Some("Retry interval must be between 5 and 300 seconds".into());
        Err(err)
    }
}

/// Validates that a retry attempt count is within valid range (1 to 20).
pub fn validate_retry_attempts(attempts: i32) -> Result<(), ValidationError> {
    if (1..=20).contains(&attempts) {
        Ok(())
    } else {
        let mut err = ValidationError::new("retry_attempts_range");
        err.message = Some("Max retry attempts must be between 1 and 20".into());
        Err(err)
    }
}

/// Validates that a recording duration is within valid range (0 to 1440 minutes).
pub fn validate_recording_duration(minutes: i32) -> Result<(), ValidationError> {
    if (0..=1440).contains(&minutes) {
        Ok(())
    } else {
        let mut err = ValidationError::new("recording_duration_range");
        err.message = Some("Recording duration must be between 0 and 1440 minutes".into());
        Err(err)
    }
}

/// Validates that a value is strictly positive.
///
/// Used for resolution dimensions and maximum connection counts.
pub fn validate_positive(value: i32) -> Result<(), ValidationError> {
    if value > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive_value");
        err.message = Some("Value must be greater than zero".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_frame_rate() {
        assert!(validate_frame_rate(1).is_ok());
        assert!(validate_frame_rate(30).is_ok());
        assert!(validate_frame_rate(60).is_ok());
        assert!(validate_frame_rate(0).is_err());
        assert!(validate_frame_rate(61).is_err());
        assert!(validate_frame_rate(-5).is_err());
    }

    #[test]
    fn test_validate_frame_rate_error_message() {
        let err = validate_frame_rate(120).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Frame rate must be between 1 and 60"
        );
    }

    #[test]
    fn test_validate_quality() {
        assert!(validate_quality(0).is_ok());
        assert!(validate_quality(80).is_ok());
        assert!(validate_quality(100).is_ok());
        assert!(validate_quality(-1).is_err());
        assert!(validate_quality(101).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0).is_ok());
        assert!(validate_percentage(50).is_ok());
        assert!(validate_percentage(100).is_ok());
        assert!(validate_percentage(-1).is_err());
        assert!(validate_percentage(101).is_err());
    }

    #[test]
    fn test_validate_connection_timeout() {
        assert!(validate_connection_timeout(5).is_ok());
        assert!(validate_connection_timeout(30).is_ok());
        assert!(validate_connection_timeout(300).is_ok());
        assert!(validate_connection_timeout(4).is_err());
        assert!(validate_connection_timeout(301).is_err());
    }

    #[test]
    fn test_validate_retry_interval() {
        assert!(validate_retry_interval(5).is_ok());
        assert!(validate_retry_interval(60).is_ok());
        assert!(validate_retry_interval(300).is_ok());
        assert!(validate_retry_interval(4).is_err());
        assert!(validate_retry_interval(301).is_err());
    }

    #[test]
    fn test_validate_retry_attempts() {
        assert!(validate_retry_attempts(1).is_ok());
        assert!(validate_retry_attempts(3).is_ok());
        assert!(validate_retry_attempts(20).is_ok());
        assert!(validate_retry_attempts(0).is_err());
        assert!(validate_retry_attempts(21).is_err());
    }

    #[test]
    fn test_validate_recording_duration() {
        assert!(validate_recording_duration(0).is_ok());
        assert!(validate_recording_duration(720).is_ok());
        assert!(validate_recording_duration(1440).is_ok());
        assert!(validate_recording_duration(-1).is_err());
        assert!(validate_recording_duration(1441).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1).is_ok());
        assert!(validate_positive(1920).is_ok());
        assert!(validate_positive(0).is_err());
        assert!(validate_positive(-10).is_err());
    }

    #[test]
    fn test_validate_retry_attempts_error_message() {
        let err = validate_retry_attempts(50).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Max retry attempts must be between 1 and 20"
        );
    }
}
