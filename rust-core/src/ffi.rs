//! C FFI Bindings for React Native Integration
//!
//! This module exposes the step detector to mobile platforms via C ABI. The
//! native bridge owns the platform sensor subscription and forwards each
//! device-motion callback to `stride_on_sample`.
//!
//! Memory Safety:
//! - The engine instance must be freed with `stride_engine_destroy()`
//! - Strings returned by this module are static; do NOT free them
//! - NULL checks are performed on all inputs
//!
//! Thread Safety:
//! - The engine is NOT thread-safe. Use a single thread or mutex.

use std::os::raw::c_char;
use std::ptr;

use tracing::warn;

use crate::progress::DailyGoal;
use crate::step_detection::{StepDetector, StepDetectorConfig};
use crate::types::{AccelerationSample, SensorAvailability};

// ============================================================================
// OPAQUE HANDLE TYPES
// ============================================================================

/// Opaque handle to a step counting engine.
pub struct StrideEngine {
    detector: StepDetector,
    goal: DailyGoal,
    sensor_status: SensorAvailability,
}

/// Result status codes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrideStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer provided.
    NullPointer = 1,
    /// Invalid parameter value.
    InvalidParameter = 2,
}

/// Output from a single sample processing.
#[repr(C)]
#[derive(Debug, Clone, Default)]
pub struct StrideSampleOutput {
    /// Timestamp in milliseconds.
    pub timestamp_ms: u64,
    /// Total steps since the last reset.
    pub step_count: u64,
    /// Step detected this sample (0 or 1).
    pub step_detected: i32,
    /// Acceleration magnitude of this sample.
    pub magnitude: f64,
    /// Progress towards the daily goal, 0..=100.
    pub progress_percent: u8,
}

/// Configuration for the engine. Zero fields take their defaults; negative
/// values are rejected.
#[repr(C)]
#[derive(Debug, Clone, Default)]
pub struct StrideConfig {
    /// Magnitude delta that counts as a step.
    pub threshold: f64,
    /// Minimum time between steps in milliseconds.
    pub refractory_ms: u64,
    /// Minimum magnitude for a step.
    pub min_magnitude: f64,
    /// Daily step goal.
    pub daily_goal: u64,
}

impl StrideConfig {
    fn detector_config(&self) -> StepDetectorConfig {
        let defaults = StepDetectorConfig::default();
        StepDetectorConfig {
            threshold: if self.threshold > 0.0 { self.threshold } else { defaults.threshold },
            refractory_ms: if self.refractory_ms > 0 {
                self.refractory_ms
            } else {
                defaults.refractory_ms
            },
            min_magnitude: if self.min_magnitude > 0.0 {
                self.min_magnitude
            } else {
                defaults.min_magnitude
            },
        }
    }

    fn goal(&self) -> DailyGoal {
        if self.daily_goal > 0 {
            DailyGoal(self.daily_goal)
        } else {
            DailyGoal::default()
        }
    }
}

// ============================================================================
// ENGINE LIFECYCLE
// ============================================================================

/// Create a new engine instance.
///
/// # Safety
/// - `config` must be NULL or a valid pointer to StrideConfig.
/// - The returned pointer must be freed with `stride_engine_destroy()`.
///
/// # Returns
/// - Pointer to StrideEngine on success.
/// - NULL if `threshold` or `min_magnitude` is negative or not finite.
#[no_mangle]
pub unsafe extern "C" fn stride_engine_create(config: *const StrideConfig) -> *mut StrideEngine {
    let config = if config.is_null() {
        StrideConfig::default()
    } else {
        (*config).clone()
    };

    if !config.threshold.is_finite() || !config.min_magnitude.is_finite() {
        warn!("rejecting non-finite step detector configuration");
        return ptr::null_mut();
    }
    if config.threshold < 0.0 || config.min_magnitude < 0.0 {
        warn!(
            threshold = config.threshold,
            min_magnitude = config.min_magnitude,
            "rejecting negative step detector configuration"
        );
        return ptr::null_mut();
    }

    let engine = Box::new(StrideEngine {
        detector: StepDetector::new(config.detector_config()),
        goal: config.goal(),
        sensor_status: SensorAvailability::Checking,
    });

    Box::into_raw(engine)
}

/// Destroy an engine instance.
///
/// Call from every teardown path of the native sensor subscription.
///
/// # Safety
/// - `engine` must be a valid pointer from `stride_engine_create()`.
/// - Must not be called more than once for the same pointer.
#[no_mangle]
pub unsafe extern "C" fn stride_engine_destroy(engine: *mut StrideEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Restart the detector: count to zero, last step time cleared.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn stride_engine_reset(engine: *mut StrideEngine) -> StrideStatus {
    if engine.is_null() {
        return StrideStatus::NullPointer;
    }

    (*engine).detector.reset();
    StrideStatus::Ok
}

// ============================================================================
// SAMPLE PROCESSING
// ============================================================================

/// Process a single acceleration sample.
///
/// # Safety
/// - `engine` must be a valid pointer.
/// - `output` must be NULL or a valid pointer to receive results.
///
/// # Parameters
/// - `timestamp_ms`: Sample timestamp in milliseconds.
/// - `accel_x/y/z`: Acceleration in the device frame.
#[no_mangle]
pub unsafe extern "C" fn stride_on_sample(
    engine: *mut StrideEngine,
    timestamp_ms: u64,
    accel_x: f64,
    accel_y: f64,
    accel_z: f64,
    output: *mut StrideSampleOutput,
) -> StrideStatus {
    if engine.is_null() {
        return StrideStatus::NullPointer;
    }

    let engine = &mut *engine;
    let sample = AccelerationSample::new(accel_x, accel_y, accel_z);
    let before = engine.detector.step_count();
    let count = engine.detector.on_sample(&sample, timestamp_ms);

    if !output.is_null() {
        let output = &mut *output;
        output.timestamp_ms = timestamp_ms;
        output.step_count = count;
        output.step_detected = i32::from(count > before);
        output.magnitude = sample.magnitude();
        output.progress_percent = engine.goal.percentage(count);
    }

    StrideStatus::Ok
}

// ============================================================================
// STATE QUERIES
// ============================================================================

/// Get the total number of steps detected, or -1 on NULL.
#[no_mangle]
pub unsafe extern "C" fn stride_get_step_count(engine: *const StrideEngine) -> i64 {
    if engine.is_null() {
        return -1;
    }

    i64::try_from((*engine).detector.step_count()).unwrap_or(i64::MAX)
}

/// Get progress towards the daily goal in 0..=100, or -1 on NULL.
#[no_mangle]
pub unsafe extern "C" fn stride_get_progress_percent(engine: *const StrideEngine) -> i32 {
    if engine.is_null() {
        return -1;
    }

    let engine = &*engine;
    i32::from(engine.goal.percentage(engine.detector.step_count()))
}

/// Record the platform's sensor availability answer.
///
/// `available`: 1 = yes, 0 = no. Other values are rejected.
#[no_mangle]
pub unsafe extern "C" fn stride_set_sensor_available(
    engine: *mut StrideEngine,
    available: i32,
) -> StrideStatus {
    if engine.is_null() {
        return StrideStatus::NullPointer;
    }

    (*engine).sensor_status = match available {
        1 => SensorAvailability::Yes,
        0 => SensorAvailability::No,
        _ => return StrideStatus::InvalidParameter,
    };
    StrideStatus::Ok
}

/// Get the sensor status string ("checking", "yes" or "no").
///
/// # Returns
/// - Static string, do NOT free. NULL if `engine` is NULL.
#[no_mangle]
pub unsafe extern "C" fn stride_get_sensor_status(engine: *const StrideEngine) -> *const c_char {
    if engine.is_null() {
        return ptr::null();
    }

    let status: &'static [u8] = match (*engine).sensor_status {
        SensorAvailability::Checking => b"checking\0",
        SensorAvailability::Yes => b"yes\0",
        SensorAvailability::No => b"no\0",
    };
    status.as_ptr() as *const c_char
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Get the library version string.
///
/// # Returns
/// - Static string, do NOT free.
#[no_mangle]
pub extern "C" fn stride_version() -> *const c_char {
    static VERSION: &[u8] = concat!("stride-sensing/", env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    unsafe fn status_of(engine: *const StrideEngine) -> String {
        CStr::from_ptr(stride_get_sensor_status(engine))
            .to_string_lossy()
            .into_owned()
    }

    unsafe fn feed(engine: *mut StrideEngine, trace: &[(f64, u64)]) -> StrideSampleOutput {
        let mut output = StrideSampleOutput::default();
        for (magnitude, t) in trace {
            let status = stride_on_sample(engine, *t, 0.0, 0.0, *magnitude, &mut output);
            assert_eq!(status, StrideStatus::Ok);
        }
        output
    }

    #[test]
    fn test_engine_lifecycle() {
        unsafe {
            let engine = stride_engine_create(ptr::null());
            assert!(!engine.is_null());

            let status = stride_engine_reset(engine);
            assert_eq!(status, StrideStatus::Ok);

            stride_engine_destroy(engine);
        }
    }

    #[test]
    fn test_sample_processing() {
        unsafe {
            let config = StrideConfig {
                daily_goal: 4,
                ..StrideConfig::default()
            };
            let engine = stride_engine_create(&config);

            let output = feed(engine, &[(1.0, 0), (3.0, 50)]);
            assert_eq!(output.timestamp_ms, 50);
            assert_eq!(output.step_count, 1);
            assert_eq!(output.step_detected, 1);
            assert_eq!(output.magnitude, 3.0);
            assert_eq!(output.progress_percent, 25);

            let output = feed(engine, &[(1.0, 400), (3.0, 450)]);
            assert_eq!(output.step_count, 2);
            assert_eq!(stride_get_step_count(engine), 2);
            assert_eq!(stride_get_progress_percent(engine), 50);

            stride_engine_reset(engine);
            assert_eq!(stride_get_step_count(engine), 0);

            stride_engine_destroy(engine);
        }
    }

    #[test]
    fn test_zero_config_uses_defaults() {
        let config = StrideConfig::default().detector_config();
        assert_eq!(config, StepDetectorConfig::default());
        assert_eq!(StrideConfig::default().goal(), DailyGoal::default());
    }

    #[test]
    fn test_non_finite_config_rejected() {
        unsafe {
            let config = StrideConfig {
                threshold: f64::NAN,
                ..StrideConfig::default()
            };
            assert!(stride_engine_create(&config).is_null());
        }
    }

    #[test]
    fn test_negative_config_rejected() {
        unsafe {
            let negative_threshold = StrideConfig {
                threshold: -1.2,
                ..StrideConfig::default()
            };
            assert!(stride_engine_create(&negative_threshold).is_null());

            let negative_floor = StrideConfig {
                min_magnitude: -0.5,
                ..StrideConfig::default()
            };
            assert!(stride_engine_create(&negative_floor).is_null());

            // Zero still means "use the default".
            let engine = stride_engine_create(&StrideConfig::default());
            assert!(!engine.is_null());
            stride_engine_destroy(engine);
        }
    }

    #[test]
    fn test_sensor_status_strings() {
        unsafe {
            let engine = stride_engine_create(ptr::null());
            assert_eq!(status_of(engine), "checking");
            assert_eq!(stride_set_sensor_available(engine, 1), StrideStatus::Ok);
            assert_eq!(status_of(engine), "yes");
            assert_eq!(stride_set_sensor_available(engine, 0), StrideStatus::Ok);
            assert_eq!(status_of(engine), "no");
            assert_eq!(
                stride_set_sensor_available(engine, 7),
                StrideStatus::InvalidParameter
            );

            stride_engine_destroy(engine);
        }
    }

    #[test]
    fn test_version() {
        let version = stride_version();
        assert!(!version.is_null());

        unsafe {
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(version_str.starts_with("stride-sensing/"));
        }
    }

    #[test]
    fn test_null_safety() {
        unsafe {
            assert_eq!(stride_engine_reset(ptr::null_mut()), StrideStatus::NullPointer);
            assert_eq!(
                stride_on_sample(ptr::null_mut(), 0, 0.0, 0.0, 0.0, ptr::null_mut()),
                StrideStatus::NullPointer
            );
            assert_eq!(stride_get_step_count(ptr::null()), -1);
            assert_eq!(stride_get_progress_percent(ptr::null()), -1);
            assert!(stride_get_sensor_status(ptr::null()).is_null());
            stride_engine_destroy(ptr::null_mut());
        }
    }
}
