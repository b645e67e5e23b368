//! Standard change sources.
//!
//! - [`ManualSource`]: notifies on demand, from any thread
//! - [`stream`]: forwards items of an async stream as notifications

pub mod stream;

use breakpoints_core::{ChangeCallback, ChangeSource};
use std::sync::{Arc, Mutex, PoisonError};

type Subscriber = Arc<dyn Fn() + Send + Sync + 'static>;

/// A change source that notifies its subscribers when told to.
///
/// Clones share the same subscriber list, so one clone can be handed to a
/// registry while another is kept by whatever observes the environment.
///
/// # Example
///
/// ```rust
/// use breakpoints_core::ChangeSource;
/// use breakpoints_std::source::ManualSource;
///
/// let source = ManualSource::new();
/// source.register(Box::new(|| println!("environment changed")));
///
/// assert_eq!(source.notify(), 1);
/// ```
#[derive(Clone, Default)]
pub struct ManualSource {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl ManualSource {
    /// Create a source with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every subscriber in registration order.
    ///
    /// Subscribers registered while the notification is running are first
    /// called on the next notification. Returns the number of subscribers
    /// invoked.
    pub fn notify(&self) -> usize {
        let snapshot: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        #[cfg(feature = "tracing")]
        tracing::trace!(subscribers = snapshot.len(), "notifying change subscribers");

        for subscriber in &snapshot {
            subscriber();
        }
        snapshot.len()
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ChangeSource for ManualSource {
    fn register(&self, callback: ChangeCallback) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::from(callback));
    }
}

impl std::fmt::Debug for ManualSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSource")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_in_registration_order() {
        let source = ManualSource::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for id in 1..=3 {
            let order = order.clone();
            source.register(Box::new(move || order.lock().unwrap().push(id)));
        }

        assert_eq!(source.notify(), 3);
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_clones_share_subscribers() {
        let source = ManualSource::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        source
            .clone()
            .register(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        assert_eq!(source.subscriber_count(), 1);
        source.notify();
        source.clone().notify();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_register_during_notify() {
        let source = ManualSource::new();
        let inner = source.clone();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        source.register(Box::new(move || {
            let counter = counter.clone();
            inner.register(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        assert_eq!(source.notify(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(source.subscriber_count(), 2);
    }

    #[test]
    fn test_notify_without_subscribers() {
        assert_eq!(ManualSource::new().notify(), 0);
    }
}
