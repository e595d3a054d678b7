//! Lock-free live property store fed by the reload engine.

use super::keys::PropertyKey;
use super::sink::ConfigurationSink;
use super::snapshot::PropertySnapshot;
use crate::error::{Result, ValidationError};
use crate::notify::{SubscriberRegistry, SubscriptionHandle};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Type alias for validator functions.
type Validator = Arc<dyn Fn(&PropertySnapshot) -> std::result::Result<(), ValidationError> + Send + Sync>;

/// The live configuration: the snapshot the rest of the process reads.
///
/// Reads go through `arc-swap`, so they never block the reload thread and
/// always observe a whole snapshot. Clones share the same state.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::prelude::*;
///
/// let initial: PropertySnapshot = [("pg.user", "admin")].into_iter().collect();
/// let live = LiveProperties::new(initial);
///
/// assert_eq!(live.value_of(PropertyKey::PgUser).as_deref(), Some("admin"));
/// ```
pub struct LiveProperties {
    /// The current snapshot, wrapped in ArcSwap for atomic updates
    current: Arc<ArcSwap<PropertySnapshot>>,
    /// Optional validator run before a snapshot is published
    validator: Option<Validator>,
    /// Subscriber registry for change notifications
    subscribers: SubscriberRegistry,
}

impl LiveProperties {
    /// Create a live store holding `initial`.
    pub fn new(initial: PropertySnapshot) -> Self {
        Self {
            current: Arc::new(ArcSwap::new(Arc::new(initial))),
            validator: None,
            subscribers: SubscriberRegistry::new(),
        }
    }

    /// Reject snapshots for which `validator` returns an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hotswap_props::prelude::*;
    ///
    /// let live = LiveProperties::new(PropertySnapshot::new()).with_validation(|props| {
    ///     match props.get("pg.password") {
    ///         Some("") => Err(ValidationError::invalid_key("pg.password", "must not be empty")),
    ///         _ => Ok(()),
    ///     }
    /// });
    ///
    /// let bad: PropertySnapshot = [("pg.password", "")].into_iter().collect();
    /// assert!(live.reload(&bad).is_err());
    /// ```
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&PropertySnapshot) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Get a reference-counted handle to the current snapshot.
    pub fn get(&self) -> Arc<PropertySnapshot> {
        self.current.load_full()
    }

    /// Current value of `key`, if set.
    pub fn value(&self, key: &str) -> Option<String> {
        self.current.load().get(key).map(str::to_string)
    }

    /// Current value of a recognized server key, if set.
    pub fn value_of(&self, key: PropertyKey) -> Option<String> {
        self.value(key.as_str())
    }

    /// Call `callback` with every snapshot published after this point.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&PropertySnapshot) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }
}

impl ConfigurationSink for LiveProperties {
    fn reload(&self, snapshot: &PropertySnapshot) -> Result<()> {
        if let Some(validator) = &self.validator {
            validator(snapshot)?;
        }

        self.current.store(Arc::new(snapshot.clone()));
        self.subscribers.notify_all(snapshot);

        Ok(())
    }
}

impl Clone for LiveProperties {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            validator: self.validator.clone(),
            subscribers: self.subscribers.clone(),
        }
    }
}
