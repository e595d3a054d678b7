//! Subscriber-based notifications for configuration changes.

use crate::core::PropertySnapshot;
use crate::error::panic_message;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

type Callback = Arc<dyn Fn(&PropertySnapshot) + Send + Sync>;

/// Handle for a subscription that can be dropped to unsubscribe.
///
/// When the handle is dropped, the subscription is removed immediately.
pub struct SubscriptionHandle {
    id: usize,
    registry: Arc<RwLock<SubscriberRegistryInner>>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        let id = self.id;
        self.registry
            .write()
            .subscribers
            .retain(|(sub_id, _)| *sub_id != id);
    }
}

/// Internal subscriber registry state.
struct SubscriberRegistryInner {
    subscribers: Vec<(usize, Callback)>,
    next_id: usize,
}

/// Registry for callbacks invoked after every applied reload.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::core::PropertySnapshot;
/// use hotswap_props::notify::SubscriberRegistry;
///
/// let registry = SubscriberRegistry::new();
///
/// let handle = registry.subscribe(|props: &PropertySnapshot| {
///     println!("{} properties now live", props.len());
/// });
///
/// registry.notify_all(&PropertySnapshot::new());
///
/// // Unsubscribe by dropping the handle
/// drop(handle);
/// assert_eq!(registry.subscriber_count(), 0);
/// ```
pub struct SubscriberRegistry {
    inner: Arc<RwLock<SubscriberRegistryInner>>,
}

impl SubscriberRegistry {
    /// Create a new subscriber registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SubscriberRegistryInner {
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `callback`; it stays registered until the handle is dropped.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&PropertySnapshot) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(callback)));

        SubscriptionHandle {
            id,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Call every subscriber, in subscription order, with `snapshot`.
    ///
    /// The lock is released before callbacks run, so a callback may
    /// subscribe or unsubscribe. A panicking callback is logged and the
    /// remaining ones still run.
    pub fn notify_all(&self, snapshot: &PropertySnapshot) {
        let callbacks: Vec<Callback> = self
            .inner
            .read()
            .subscribers
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
                tracing::error!(reason = panic_message(&*payload), "configuration subscriber panicked");
            }
        }
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().subscribers.len()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SubscriberRegistry {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscribe_and_notify() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let _handle = registry.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.notify_all(&PropertySnapshot::new());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        registry.notify_all(&PropertySnapshot::new());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_callback_does_not_stop_others() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _broken = registry.subscribe(|_| panic!("subscriber bug"));
        let counter_clone = Arc::clone(&counter);
        let _handle = registry.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.notify_all(&PropertySnapshot::new());
        registry.notify_all(&PropertySnapshot::new());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(registry.subscriber_count(), 2);
    }

    #[test]
    fn test_callback_sees_snapshot() {
        let registry = SubscriberRegistry::new();
        let seen = Arc::new(parking_lot::Mutex::new(None));

        let seen_clone = Arc::clone(&seen);
        let _handle = registry.subscribe(move |props| {
            *seen_clone.lock() = props.get("pg.user").map(str::to_string);
        });

        let props: PropertySnapshot = [("pg.user", "reporting")].into_iter().collect();
        registry.notify_all(&props);
        assert_eq!(seen.lock().as_deref(), Some("reporting"));
    }

    #[test]
    fn test_unsubscribe_on_drop() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let handle = registry.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(registry.subscriber_count(), 1);

        drop(handle);
        assert_eq!(registry.subscriber_count(), 0);

        registry.notify_all(&PropertySnapshot::new());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clone_registry_shares_subscribers() {
        let registry = SubscriberRegistry::new();
        let registry2 = registry.clone();

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        let _handle = registry.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry2.notify_all(&PropertySnapshot::new());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
