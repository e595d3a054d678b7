//! Configuration change notification system.
//!
//! Provides the blocking [`ChangeWatcher`] capability with native and polling
//! backends, and subscriber-based notifications when properties are reloaded.

mod change;
mod poll;
pub mod subscriber;
#[cfg(feature = "file-watch")]
pub mod watcher;

pub use change::{ChangeWatcher, Closer, DEFAULT_DEBOUNCE, DEFAULT_POLL_INTERVAL, WatchStrategy, watcher_for};
pub use poll::PollingWatcher;
pub use subscriber::{SubscriberRegistry, SubscriptionHandle};
#[cfg(feature = "file-watch")]
pub use watcher::NotifyWatcher;
