//! Stride Sensing Core
//!
//! A small, platform-agnostic core for a fitness-tracking client. It converts
//! a push stream of 3-axis acceleration samples into a step count, owns the
//! lifetime of the motion sensor subscription during a workout session, and
//! resolves the map centre from an external location capability.
//!
//! # Design Philosophy
//!
//! - **Owned state**: every detector is an explicit instance; there are no
//!   global counters, so independent detectors never interfere.
//! - **Scoped subscriptions**: attaching to a sensor returns a handle whose
//!   drop detaches the listener on every exit path.
//! - **Degrade, never fail**: a missing sensor or location fix degrades to a
//!   visible "unavailable" state; nothing here is fatal.
//!
//! # Example
//!
//! ```
//! use stride_sensing::{AccelerationSample, StepDetector};
//!
//! let mut detector = StepDetector::default();
//! for (magnitude, t) in [(1.0, 0), (3.0, 50), (1.0, 400), (3.0, 450)] {
//!     detector.on_sample(&AccelerationSample::along_z(magnitude), t);
//! }
//! assert_eq!(detector.step_count(), 2);
//! ```

pub mod config;
pub mod error;
pub mod ffi;
pub mod location;
pub mod logging;
pub mod progress;
pub mod sensor;
pub mod session;
pub mod step_detection;
pub mod types;


// Re-export commonly used types
pub use config::TrackerConfig;
pub use error::{ConfigError, LocationError, SensorError, SessionError};
pub use location::{resolve_map_view, LocationProvider, MapRegion, MapView, UserNotice};
pub use progress::{DailyGoal, StepProgress, WeeklySummary};
pub use sensor::{MotionSource, ReplayMotionSource, Subscription};
pub use session::{StepCounterHandle, WorkoutSession};
pub use step_detection::{StepDetector, StepDetectorConfig};
pub use types::{
    AccelerationSample, Coordinate, MotionReading, PermissionStatus, SensorAvailability,
};
