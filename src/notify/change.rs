//! The blocking change-notification capability and backend selection.

use super::poll::PollingWatcher;
use crate::error::{Result, WatchError};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Polling interval used when native notification is unavailable.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Quiet period used to coalesce bursts of native events.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Blocks the calling thread until a watched file changes.
///
/// The reload engine re-arms the watcher by calling
/// [`wait_for_change`](ChangeWatcher::wait_for_change) in a loop.
pub trait ChangeWatcher: Send {
    /// Block until the watched path changes.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Closed`] once the watcher's [`Closer`] has fired,
    /// and [`WatchError::Backend`] when the notification backend fails. A
    /// backend error does not close the watcher.
    fn wait_for_change(&mut self) -> std::result::Result<(), WatchError>;

    /// A handle that unblocks a pending wait from any thread.
    fn closer(&self) -> Closer;
}

impl ChangeWatcher for Box<dyn ChangeWatcher> {
    fn wait_for_change(&mut self) -> std::result::Result<(), WatchError> {
        (**self).wait_for_change()
    }

    fn closer(&self) -> Closer {
        (**self).closer()
    }
}

/// Thread-safe callback that closes a [`ChangeWatcher`].
#[derive(Clone)]
pub struct Closer(Arc<dyn Fn() + Send + Sync>);

impl Closer {
    /// Wrap a close action.
    pub fn new<F>(close: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(close))
    }

    /// Fire the close action. Safe to call more than once.
    pub fn close(&self) {
        (*self.0)()
    }
}

impl fmt::Debug for Closer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Closer")
    }
}

/// Which notification backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchStrategy {
    /// Native notifications when compiled in, polling otherwise or on failure.
    #[default]
    Auto,
    /// OS notifications; requires the `file-watch` feature.
    Native {
        /// Quiet period used to coalesce event bursts
        debounce: Duration,
    },
    /// Stat the file on a fixed interval.
    Polling {
        /// Time between checks
        interval: Duration,
    },
}

/// Build a watcher for `path` using `strategy`.
///
/// # Errors
///
/// Returns [`ReloadError::FeatureNotEnabled`](crate::error::ReloadError::FeatureNotEnabled)
/// for [`WatchStrategy::Native`] without the `file-watch` feature, or a watch
/// error if the native backend cannot be set up.
pub fn watcher_for(path: &Path, strategy: WatchStrategy) -> Result<Box<dyn ChangeWatcher>> {
    match strategy {
        WatchStrategy::Polling { interval } => Ok(Box::new(PollingWatcher::new(path, interval))),
        WatchStrategy::Native { debounce } => native(path, debounce),
        WatchStrategy::Auto => match native(path, DEFAULT_DEBOUNCE) {
            Ok(watcher) => Ok(watcher),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "native file watching unavailable, falling back to polling"
                );
                Ok(Box::new(PollingWatcher::new(path, DEFAULT_POLL_INTERVAL)))
            }
        },
    }
}

#[cfg(feature = "file-watch")]
fn native(path: &Path, debounce: Duration) -> Result<Box<dyn ChangeWatcher>> {
    Ok(Box::new(super::NotifyWatcher::new(path, debounce)?))
}

#[cfg(not(feature = "file-watch"))]
fn native(_path: &Path, _debounce: Duration) -> Result<Box<dyn ChangeWatcher>> {
    Err(crate::error::ReloadError::FeatureNotEnabled("file-watch"))
}
