//! Core data types for the step sensing core.
//!
//! This module defines the small set of values that cross the boundary
//! between the platform sensor layer and the counting logic. Samples are
//! ephemeral: they are consumed as soon as they arrive and never retained.
//!
//! Design principle: if a concept exists, it gets a type. Availability and
//! permission states are enums rather than loose strings or booleans.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single 3-axis acceleration reading in the device-local reference frame.
///
/// Units follow whatever the platform motion sensor delivers (m/s² on most
/// devices, gravity excluded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerationSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the acceleration vector.
    pub fn magnitude(&self) -> f64 {
        let x2 = self.x * self.x;
        let y2 = self.y * self.y;
        let z2 = self.z * self.z;
        (x2 + y2 + z2).sqrt()
    }

    /// Sample whose magnitude equals `magnitude`, aligned with the Z axis.
    ///
    /// Handy for replaying magnitude traces.
    pub fn along_z(magnitude: f64) -> Self {
        Self::new(0.0, 0.0, magnitude)
    }
}

/// One callback payload from the device-motion sensor.
///
/// Platforms occasionally deliver rotation-only events with no acceleration
/// attached; those readings are skipped by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionReading {
    /// Wall-clock timestamp of the reading in milliseconds.
    pub timestamp_ms: u64,
    pub acceleration: Option<AccelerationSample>,
}

impl MotionReading {
    pub fn new(timestamp_ms: u64, acceleration: AccelerationSample) -> Self {
        Self {
            timestamp_ms,
            acceleration: Some(acceleration),
        }
    }

    /// A reading that carries no acceleration data.
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            acceleration: None,
        }
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Whether the step sensor can be used on this device.
///
/// Starts as `Checking` until the platform answers the availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorAvailability {
    #[default]
    Checking,
    Yes,
    No,
}

impl SensorAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorAvailability::Checking => "checking",
            SensorAvailability::Yes => "yes",
            SensorAvailability::No => "no",
        }
    }
}

impl From<bool> for SensorAvailability {
    fn from(available: bool) -> Self {
        if available {
            SensorAvailability::Yes
        } else {
            SensorAvailability::No
        }
    }
}

impl fmt::Display for SensorAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a foreground permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user dismissed the prompt without answering.
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_is_euclidean_norm() {
        let sample = AccelerationSample::new(3.0, 4.0, 12.0);
        assert!((sample.magnitude() - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_along_z_preserves_magnitude() {
        assert_eq!(AccelerationSample::along_z(2.5).magnitude(), 2.5);
    }

    #[test]
    fn test_availability_strings() {
        assert_eq!(SensorAvailability::default().as_str(), "checking");
        assert_eq!(SensorAvailability::from(true).to_string(), "yes");
        assert_eq!(SensorAvailability::from(false).to_string(), "no");
    }

    #[test]
    fn test_availability_serializes_lowercase() {
        let json = serde_json::to_string(&SensorAvailability::Checking).unwrap();
        assert_eq!(json, "\"checking\"");
    }

    #[test]
    fn test_empty_reading_has_no_acceleration() {
        let reading = MotionReading::empty(42);
        assert_eq!(reading.timestamp_ms, 42);
        assert!(reading.acceleration.is_none());
    }

    #[test]
    fn test_permission_granted() {
        assert!(PermissionStatus::Granted.is_granted());
        assert!(!PermissionStatus::Denied.is_granted());
        assert!(!PermissionStatus::Undetermined.is_granted());
    }
}
