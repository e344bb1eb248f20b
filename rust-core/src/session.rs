//! Workout session lifecycle.
//!
//! A session ties one [`StepDetector`] to one sensor subscription. Starting a
//! session restarts the detector and attaches a listener; stopping (or
//! dropping) the session releases the subscription. There is never more than
//! one active subscription per session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::error::SessionError;
use crate::progress::{DailyGoal, StepProgress};
use crate::sensor::{availability_status, MotionSource, Subscription};
use crate::step_detection::{StepDetector, StepDetectorConfig};
use crate::types::{MotionReading, SensorAvailability};

/// Shared handle to a step detector.
///
/// The sensor listener and presentation code both hold a handle; every
/// access goes through the same owned instance.
#[derive(Debug, Clone, Default)]
pub struct StepCounterHandle {
    inner: Arc<Mutex<StepDetector>>,
}

impl StepCounterHandle {
    pub fn new(detector: StepDetector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }

    /// Feed one motion reading. Readings without acceleration are skipped.
    pub fn on_reading(&self, reading: &MotionReading) -> u64 {
        let mut detector = self.lock();
        match reading.acceleration {
            Some(sample) => detector.on_sample(&sample, reading.timestamp_ms),
            None => detector.step_count(),
        }
    }

    pub fn step_count(&self) -> u64 {
        self.lock().step_count()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    fn lock(&self) -> MutexGuard<'_, StepDetector> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A start/stop workout session counting steps from a motion source.
#[derive(Debug)]
pub struct WorkoutSession {
    counter: StepCounterHandle,
    subscription: Option<Subscription>,
    sensor_status: SensorAvailability,
}

impl Default for WorkoutSession {
    fn default() -> Self {
        Self::new(StepDetectorConfig::default())
    }
}

impl WorkoutSession {
    pub fn new(config: StepDetectorConfig) -> Self {
        Self {
            counter: StepCounterHandle::new(StepDetector::new(config)),
            subscription: None,
            sensor_status: SensorAvailability::Checking,
        }
    }

    /// Start counting from `source`.
    ///
    /// The detector is restarted, so the count begins at zero. On failure the
    /// session stays idle and the sensor status reads `"no"`.
    pub fn start<S: MotionSource + ?Sized>(&mut self, source: &S) -> Result<(), SessionError> {
        if self.is_active() {
            return Err(SessionError::AlreadyActive);
        }

        self.sensor_status = availability_status(source);
        self.counter.reset();

        let counter = self.counter.clone();
        let subscription = source
            .subscribe(Box::new(move |reading| {
                counter.on_reading(&reading);
            }))
            .map_err(|err| {
                warn!(error = %err, "failed to start motion step counting");
                self.sensor_status = SensorAvailability::No;
                err
            })?;

        info!("workout session started");
        self.subscription = Some(subscription);
        Ok(())
    }

    /// Stop counting and return the final step count.
    ///
    /// Safe to call when the session is already stopped.
    pub fn stop(&mut self) -> u64 {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
            info!(steps = self.counter.step_count(), "workout session stopped");
        }
        self.counter.step_count()
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn step_count(&self) -> u64 {
        self.counter.step_count()
    }

    pub fn progress(&self, goal: DailyGoal) -> StepProgress {
        goal.snapshot(self.step_count())
    }

    pub fn sensor_status(&self) -> SensorAvailability {
        self.sensor_status
    }

    /// Handle for readers that outlive a borrow of the session.
    pub fn counter(&self) -> StepCounterHandle {
        self.counter.clone()
    }
}

impl Drop for WorkoutSession {
    fn drop(&mut self) {
        self.stop();
    }
}
