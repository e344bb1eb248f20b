//! Step Detection Module.
//!
//! Converts a continuous acceleration-magnitude signal into a discrete step
//! count using a magnitude-delta threshold and a refractory period:
//! - The first sample only establishes the magnitude baseline
//! - A step needs a large enough jump from the previous sample's magnitude
//! - The current magnitude must clear a floor (filters sensor jitter at rest)
//! - Another step is suppressed until the refractory period has elapsed
//!   since the last counted step
//!
//! No smoothing is applied. This is a lightweight heuristic; false positives
//! and negatives on noisy input are expected.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::AccelerationSample;

/// Configuration for step detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepDetectorConfig {
    /// Minimum magnitude change between consecutive samples to count a step.
    pub threshold: f64,
    /// Minimum time after a counted step before another can be counted (ms).
    pub refractory_ms: u64,
    /// Minimum magnitude of the current sample for it to count as a step.
    pub min_magnitude: f64,
}

impl Default for StepDetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 1.2,
            refractory_ms: 300,
            min_magnitude: 1.0,
        }
    }
}

/// Step detector driven by acceleration magnitude deltas.
///
/// Each instance owns its state; independent detectors never interfere.
#[derive(Debug, Clone)]
pub struct StepDetector {
    config: StepDetectorConfig,

    // Baseline from the previous sample
    last_magnitude: Option<f64>,

    // Refractory reference point
    last_step_ms: Option<u64>,

    step_count: u64,
}

impl Default for StepDetector {
    fn default() -> Self {
        Self::new(StepDetectorConfig::default())
    }
}

impl StepDetector {
    /// Create a new step detector with the given configuration.
    pub fn new(config: StepDetectorConfig) -> Self {
        Self {
            config,
            last_magnitude: None,
            last_step_ms: None,
            step_count: 0,
        }
    }

    /// Process one acceleration sample observed at `now_ms`.
    ///
    /// Returns the step count after the sample has been applied.
    pub fn on_sample(&mut self, sample: &AccelerationSample, now_ms: u64) -> u64 {
        let magnitude = sample.magnitude();
        if !magnitude.is_finite() {
            return self.step_count;
        }

        if let Some(previous) = self.last_magnitude {
            let delta = (magnitude - previous).abs();
            if delta > self.config.threshold
                && self.refractory_elapsed(now_ms)
                && magnitude > self.config.min_magnitude
            {
                self.step_count += 1;
                self.last_step_ms = Some(now_ms);
                debug!(total = self.step_count, magnitude, "step detected");
            }
        }

        self.last_magnitude = Some(magnitude);
        self.step_count
    }

    /// Process a batch of timestamped samples and return the final count.
    pub fn process_batch(&mut self, samples: &[(AccelerationSample, u64)]) -> u64 {
        for (sample, now_ms) in samples {
            self.on_sample(sample, *now_ms);
        }
        self.step_count
    }

    /// Get the total number of steps detected since the last reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Timestamp of the most recent counted step, if any.
    pub fn last_step_ms(&self) -> Option<u64> {
        self.last_step_ms
    }

    /// Magnitude of the most recent accepted sample, if any.
    pub fn last_magnitude(&self) -> Option<f64> {
        self.last_magnitude
    }

    pub fn config(&self) -> &StepDetectorConfig {
        &self.config
    }

    /// Restart the detector: count back to zero, baseline and refractory
    /// reference cleared.
    pub fn reset(&mut self) {
        self.last_magnitude = None;
        self.last_step_ms = None;
        self.step_count = 0;
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn refractory_elapsed(&self, now_ms: u64) -> bool {
        match self.last_step_ms {
            // Backwards clocks saturate to zero elapsed time
            Some(last) => now_ms.saturating_sub(last) > self.config.refractory_ms,
            None => true,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
