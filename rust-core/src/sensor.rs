//! Motion sensor subscription.
//!
//! Platform sensors push readings through callbacks. Here a subscription is
//! an explicit handle: attaching a listener returns a [`Subscription`], and
//! dropping or cancelling it detaches the listener. Teardown runs exactly once
//! on every exit path, so no reading is ever delivered into a listener whose
//! owner has gone away.
//!
//! Thread Safety:
//! - Readings are delivered one at a time; a listener never runs concurrently
//!   with itself.
//! - Teardown waits for an in-flight delivery to finish, except when the
//!   listener itself tears the subscription down mid-delivery.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::{info, warn};

use crate::error::SensorError;
use crate::types::{MotionReading, SensorAvailability};

/// Callback receiving motion readings.
pub type MotionListener = Box<dyn FnMut(MotionReading) + Send>;

/// A push-based source of device-motion readings.
pub trait MotionSource {
    /// Check whether the sensor can be used.
    fn availability(&self) -> Result<bool, SensorError>;

    /// Attach `listener`. At most one subscription may be active per source.
    fn subscribe(&self, listener: MotionListener) -> Result<Subscription, SensorError>;
}

/// Map a source's availability check to the status shown to the user.
pub fn availability_status<S: MotionSource + ?Sized>(source: &S) -> SensorAvailability {
    match source.availability() {
        Ok(available) => SensorAvailability::from(available),
        Err(err) => {
            warn!(error = %err, "motion sensor availability check failed");
            SensorAvailability::No
        }
    }
}

/// Disposable handle to an active sensor subscription.
///
/// Dropping the handle cancels the subscription.
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a teardown action to run when the subscription ends.
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Detach the listener now. Later calls are no-ops.
    pub fn cancel(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            info!("cleaning up motion subscription");
            teardown();
        }
    }

    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// ============================================================================
// REPLAY SOURCE
// ============================================================================

struct ListenerSlot {
    /// Bumped on every subscribe so a stale teardown cannot detach a newer
    /// listener.
    generation: u64,
    subscribed: bool,
    /// Empty while a delivery has the listener checked out.
    listener: Option<MotionListener>,
    delivering: Option<ThreadId>,
}

struct Shared {
    /// Serialises deliveries.
    delivery: Mutex<()>,
    slot: Mutex<ListenerSlot>,
}

/// In-process motion source that delivers readings pushed by the caller.
///
/// Used to replay recorded traces and to drive sessions in tests. Clones share
/// the same listener slot.
#[derive(Clone)]
pub struct ReplayMotionSource {
    shared: Arc<Shared>,
    available: bool,
}

impl Default for ReplayMotionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayMotionSource {
    pub fn new() -> Self {
        let slot = ListenerSlot {
            generation: 0,
            subscribed: false,
            listener: None,
            delivering: None,
        };
        Self {
            shared: Arc::new(Shared {
                delivery: Mutex::new(()),
                slot: Mutex::new(slot),
            }),
            available: true,
        }
    }

    /// A source that reports the sensor as missing and refuses subscriptions.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Deliver one reading to the active listener.
    ///
    /// Returns `false` when nobody is subscribed. The listener runs without the
    /// slot lock held, so it may cancel or drop its own subscription. It must
    /// not call `emit` on the same source.
    pub fn emit(&self, reading: MotionReading) -> bool {
        let _delivery = lock(&self.shared.delivery);

        let (generation, mut listener) = {
            let mut slot = lock(&self.shared.slot);
            if !slot.subscribed {
                return false;
            }
            let Some(listener) = slot.listener.take() else {
                return false;
            };
            slot.delivering = Some(thread::current().id());
            (slot.generation, listener)
        };

        listener(reading);

        let detached = {
            let mut slot = lock(&self.shared.slot);
            slot.delivering = None;
            if slot.subscribed && slot.generation == generation {
                slot.listener = Some(listener);
                None
            } else {
                Some(listener)
            }
        };
        drop(detached);
        true
    }

    /// Deliver readings in order, returning how many reached a listener.
    pub fn emit_all<I>(&self, readings: I) -> usize
    where
        I: IntoIterator<Item = MotionReading>,
    {
        readings
            .into_iter()
            .filter(|reading| self.emit(*reading))
            .count()
    }

    pub fn has_listener(&self) -> bool {
        lock(&self.shared.slot).subscribed
    }
}

impl MotionSource for ReplayMotionSource {
    fn availability(&self) -> Result<bool, SensorError> {
        Ok(self.available)
    }

    fn subscribe(&self, listener: MotionListener) -> Result<Subscription, SensorError> {
        if !self.available {
            return Err(SensorError::Unavailable);
        }

        let generation = {
            let mut slot = lock(&self.shared.slot);
            if slot.subscribed {
                return Err(SensorError::AlreadySubscribed);
            }
            slot.generation += 1;
            slot.subscribed = true;
            slot.listener = Some(listener);
            slot.generation
        };
        info!("motion detection active");

        let shared = Arc::clone(&self.shared);
        Ok(Subscription::new(move || {
            let inside_listener = lock(&shared.slot).delivering == Some(thread::current().id());
            let _delivery = (!inside_listener).then(|| lock(&shared.delivery));

            let detached = {
                let mut slot = lock(&shared.slot);
                if slot.generation != generation {
                    return;
                }
                slot.subscribed = false;
                slot.listener.take()
            };
            drop(detached);
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccelerationSample;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener(counter: &Arc<AtomicUsize>) -> MotionListener {
        let counter = Arc::clone(counter);
        Box::new(move |_reading| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn reading(t: u64) -> MotionReading {
        MotionReading::new(t, AccelerationSample::along_z(1.0))
    }

    #[test]
    fn test_emit_without_listener() {
        let source = ReplayMotionSource::new();
        assert!(!source.emit(reading(0)));
    }

    #[test]
    fn test_subscription_receives_readings() {
        let source = ReplayMotionSource::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let _subscription = source.subscribe(counting_listener(&counter)).unwrap();

        assert_eq!(source.emit_all((0..5).map(reading)), 5);
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_drop_detaches_listener() {
        let source = ReplayMotionSource::new();
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let _subscription = source.subscribe(counting_listener(&counter)).unwrap();
            source.emit(reading(0));
        }
        assert!(!source.has_listener());
        assert!(!source.emit(reading(1)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let source = ReplayMotionSource::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let mut subscription = source.subscribe(counting_listener(&counter)).unwrap();

        subscription.cancel();
        subscription.cancel();

        assert!(!subscription.is_active());
        assert!(!source.has_listener());
    }

    #[test]
    fn test_teardown_runs_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&runs);
        let mut subscription = Subscription::new(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });
        subscription.cancel();
        drop(subscription);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_second_subscription_rejected() {
        let source = ReplayMotionSource::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let _first = source.subscribe(counting_listener(&counter)).unwrap();
        let second = source.subscribe(counting_listener(&counter));
        assert_eq!(second.unwrap_err(), SensorError::AlreadySubscribed);
    }

    #[test]
    fn test_resubscribe_after_cancel() {
        let source = ReplayMotionSource::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let mut first = source.subscribe(counting_listener(&counter)).unwrap();
        first.cancel();
        let _second = source.subscribe(counting_listener(&counter)).unwrap();
        drop(first);

        assert!(source.has_listener());
        assert!(source.emit(reading(0)));
    }

    #[test]
    fn test_unavailable_source() {
        let source = ReplayMotionSource::unavailable();
        let counter = Arc::new(AtomicUsize::new(0));
        assert_eq!(
            source.subscribe(counting_listener(&counter)).unwrap_err(),
            SensorError::Unavailable
        );
        assert_eq!(availability_status(&source), SensorAvailability::No);
        assert_eq!(availability_status(&ReplayMotionSource::new()), SensorAvailability::Yes);
    }

    #[test]
    fn test_listener_can_cancel_itself() {
        let source = ReplayMotionSource::new();
        let handle: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let listener: MotionListener = {
            let handle = Arc::clone(&handle);
            let calls = Arc::clone(&calls);
            Box::new(move |_reading| {
                calls.fetch_add(1, Ordering::SeqCst);
                let own = lock(&handle).take();
                if let Some(mut subscription) = own {
                    subscription.cancel();
                }
            })
        };
        *lock(&handle) = Some(source.subscribe(listener).unwrap());

        assert!(source.emit(reading(0)));
        assert!(!source.has_listener());
        assert!(!source.emit(reading(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_can_drop_itself() {
        let source = ReplayMotionSource::new();
        let handle: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let listener: MotionListener = {
            let handle = Arc::clone(&handle);
            Box::new(move |_reading| {
                let own = lock(&handle).take();
                drop(own);
            })
        };
        *lock(&handle) = Some(source.subscribe(listener).unwrap());

        assert!(source.emit(reading(0)));
        assert!(!source.has_listener());

        // The slot is free again for a fresh subscriber.
        let counter = Arc::new(AtomicUsize::new(0));
        let _next = source.subscribe(counting_listener(&counter)).unwrap();
        assert!(source.emit(reading(1)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    struct BrokenSource;

    impl MotionSource for BrokenSource {
        fn availability(&self) -> Result<bool, SensorError> {
            Err(SensorError::Platform("sensor query timed out".into()))
        }

        fn subscribe(&self, _listener: MotionListener) -> Result<Subscription, SensorError> {
            Err(SensorError::PermissionDenied)
        }
    }

    #[test]
    fn test_failed_check_reports_no() {
        assert_eq!(availability_status(&BrokenSource), SensorAvailability::No);
    }
}
