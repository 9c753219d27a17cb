//! Scripted rotation source for testing.

use crate::application::ports::{EventFn, RotationAxis, RotationSource};
use std::sync::{Arc, Mutex, MutexGuard};

/// [`RotationSource`] whose movements are triggered by the test.
#[derive(Clone, Default)]
pub struct MockRotationSource {
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

struct Subscription {
    axis: RotationAxis,
    threshold: f32,
    handler: EventFn,
}

impl MockRotationSource {
    /// Create a source with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    fn subs(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions.lock().expect(
            "MockRotationSource mutex poisoned - a test thread panicked while holding the lock",
        )
    }

    /// Axes and thresholds subscribed so far, in subscription order.
    pub fn subscriptions(&self) -> Vec<(RotationAxis, f32)> {
        self.subs()
            .iter()
            .map(|s| (s.axis, s.threshold))
            .collect()
    }

    /// Simulate a quick movement on `axis`, calling every handler for it.
    ///
    /// Returns the number of handlers called.
    pub fn emit(&self, axis: RotationAxis) -> usize {
        let handlers: Vec<EventFn> = self
            .subs()
            .iter()
            .filter(|s| s.axis == axis)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        for handler in &handlers {
            handler();
        }
        handlers.len()
    }
}

impl RotationSource for MockRotationSource {
    fn subscribe(&self, axis: RotationAxis, threshold: f32, handler: EventFn) {
        self.subs().push(Subscription {
            axis,
            threshold,
            handler,
        });
    }
}
