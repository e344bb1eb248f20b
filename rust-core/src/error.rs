//! Error types for the sensing core.
//!
//! None of these are fatal. Every failure degrades to an "unavailable"
//! state that presentation code can render; the step detector itself
//! never produces an error.

use thiserror::Error;

/// Failures from a motion sensor source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("motion sensor is not available on this device")]
    Unavailable,
    #[error("motion sensor permission denied")]
    PermissionDenied,
    /// Only one listener may be attached to a source at a time.
    #[error("motion source already has an active subscription")]
    AlreadySubscribed,
    #[error("motion sensor failure: {0}")]
    Platform(String),
}

/// Failures from the location capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission request failed: {0}")]
    PermissionRequest(String),
    #[error("unable to fetch current position: {0}")]
    PositionUnavailable(String),
}

/// Failures while starting or stopping a workout session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a workout session is already active")]
    AlreadyActive,
    #[error(transparent)]
    Sensor(#[from] SensorError),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("environment variable {name} has invalid value {value:?}")]
    Env { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_error_converts_into_session_error() {
        let err: SessionError = SensorError::Unavailable.into();
        assert_eq!(err, SessionError::Sensor(SensorError::Unavailable));
        assert_eq!(err.to_string(), "motion sensor is not available on this device");
    }

    #[test]
    fn test_env_error_message_names_variable() {
        let err = ConfigError::Env {
            name: "STRIDE_THRESHOLD",
            value: "abc".into(),
        };
        assert!(err.to_string().contains("STRIDE_THRESHOLD"));
    }
}
