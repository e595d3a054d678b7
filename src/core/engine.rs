//! The reload-decision engine and its watch loop.

use super::diff::ChangeSet;
use super::keys::KeyPolicy;
use super::sink::ConfigurationSink;
use super::snapshot::PropertySnapshot;
use crate::error::{ReloadError, Result, WatchError, panic_message};
use crate::notify::{ChangeWatcher, Closer};
use crate::sources::{PropertySource, Timestamp};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// What a single change notification led to.
#[derive(Debug)]
pub enum ReloadOutcome {
    /// The engine is closed; nothing was read.
    Closed,
    /// No snapshot has been accepted yet (`start` has not succeeded).
    NotStarted,
    /// The modification time did not advance; nothing was read.
    Spurious,
    /// The file was re-read but holds exactly the accepted properties.
    Unchanged,
    /// The file differs, but only in keys that are unknown or not reloadable.
    Ignored(ChangeSet),
    /// The accepted snapshot was updated and pushed to the sink.
    Reloaded(ChangeSet),
    /// Reading, parsing, or applying failed; the accepted snapshot is untouched.
    Failed(ReloadError),
}

impl ReloadOutcome {
    /// Whether the sink received a new snapshot.
    pub fn is_reloaded(&self) -> bool {
        matches!(self, Self::Reloaded(_))
    }
}

/// Closes a running [`ReloadEngine`] from any thread.
///
/// Closing is idempotent. A blocked wait returns promptly; a notification
/// already being processed finishes first.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    closed: Arc<AtomicBool>,
    closer: Closer,
}

impl ReloadHandle {
    /// Stop the watch loop.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.closer.close();
        }
    }

    /// Whether the engine has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Keeps a live configuration in step with a properties file, applying only
/// reloadable keys.
///
/// The engine owns the accepted snapshot and the last-seen modification time.
/// Both are touched only by the thread running [`watch`](Self::watch), so no
/// locking is involved.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::prelude::*;
/// use std::sync::Arc;
///
/// # fn example() -> Result<()> {
/// let live = Arc::new(LiveProperties::new(PropertySnapshot::new()));
///
/// let engine = ReloadEngine::builder()
///     .with_conf_root("/var/lib/db/conf")
///     .build(Arc::clone(&live))?;
///
/// let (handle, join) = engine.spawn()?;
/// // ... serve traffic, reading live.value_of(PropertyKey::PgPassword) ...
/// handle.close();
/// join.join().ok();
/// # Ok(())
/// # }
/// ```
pub struct ReloadEngine {
    source: Box<dyn PropertySource>,
    watcher: Option<Box<dyn ChangeWatcher>>,
    sink: Box<dyn ConfigurationSink>,
    policy: KeyPolicy,
    accepted: Option<PropertySnapshot>,
    last_modified: Timestamp,
    closed: Arc<AtomicBool>,
    closer: Closer,
}

impl ReloadEngine {
    /// Assemble an engine from its collaborators.
    pub fn new(
        source: impl PropertySource + 'static,
        watcher: impl ChangeWatcher + 'static,
        sink: impl ConfigurationSink + 'static,
        policy: KeyPolicy,
    ) -> Self {
        let closer = watcher.closer();
        Self {
            source: Box::new(source),
            watcher: Some(Box::new(watcher)),
            sink: Box::new(sink),
            policy,
            accepted: None,
            last_modified: 0,
            closed: Arc::new(AtomicBool::new(false)),
            closer,
        }
    }

    /// A handle for closing the engine from another thread.
    pub fn handle(&self) -> ReloadHandle {
        ReloadHandle {
            closed: Arc::clone(&self.closed),
            closer: self.closer.clone(),
        }
    }

    /// The accepted snapshot, once [`start`](Self::start) has succeeded.
    pub fn accepted(&self) -> Option<&PropertySnapshot> {
        self.accepted.as_ref()
    }

    /// Modification time of the last file version that was read.
    pub fn last_modified(&self) -> Timestamp {
        self.last_modified
    }

    /// Whether the engine has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Load the initial snapshot and record its modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    pub fn start(&mut self) -> Result<()> {
        let modified = self.source.last_modified()?;
        let snapshot = self.source.load()?;

        info!(
            source = %self.source.name(),
            keys = snapshot.len(),
            "loaded initial configuration"
        );
        self.last_modified = self.last_modified.max(modified);
        self.accepted = Some(snapshot);
        Ok(())
    }

    /// Process one change notification.
    ///
    /// Never returns an error: every failure, including a panic inside the
    /// sink, is logged and reported as [`ReloadOutcome::Failed`], leaving the
    /// accepted snapshot as it was.
    pub fn handle_change(&mut self) -> ReloadOutcome {
        if self.is_closed() {
            return ReloadOutcome::Closed;
        }
        let Some(accepted) = self.accepted.as_mut() else {
            return ReloadOutcome::NotStarted;
        };

        let modified = match self.source.last_modified() {
            Ok(modified) => modified,
            Err(err) => {
                error!(error = %err, "failed to read configuration modification time");
                return ReloadOutcome::Failed(err);
            }
        };
        if modified <= self.last_modified {
            return ReloadOutcome::Spurious;
        }
        // Recorded even if the content turns out identical or unreadable
        self.last_modified = modified;

        let incoming = match self.source.load() {
            Ok(incoming) => incoming,
            Err(err) => {
                error!(error = %err, "failed to reload configuration");
                return ReloadOutcome::Failed(err);
            }
        };
        if incoming == *accepted {
            return ReloadOutcome::Unchanged;
        }

        let changes = ChangeSet::between(accepted, &incoming, &self.policy);
        if !changes.has_changes() {
            return ReloadOutcome::Ignored(changes);
        }

        let previous = accepted.clone();
        changes.apply_to(accepted);
        let sink = &self.sink;
        let pushed = panic::catch_unwind(AssertUnwindSafe(|| sink.reload(&*accepted))).unwrap_or_else(|payload| {
            Err(ReloadError::Sink(format!(
                "panicked while applying configuration: {}",
                panic_message(&*payload)
            )))
        });
        match pushed {
            Ok(()) => {
                info!(
                    updated = changes.updated.len(),
                    removed = changes.removed.len(),
                    "config reloaded!"
                );
                ReloadOutcome::Reloaded(changes)
            }
            Err(err) => {
                *accepted = previous;
                error!(error = %err, "live configuration refused reload, keeping previous values");
                ReloadOutcome::Failed(err)
            }
        }
    }

    /// Load the initial snapshot, then process changes until closed.
    ///
    /// If the initial load fails the error is logged and the method returns
    /// without watching; the process keeps its startup configuration.
    pub fn watch(&mut self) {
        if let Err(err) = self.start() {
            error!(error = %err, "failed to load configuration, hot reload disabled");
            self.close();
            return;
        }
        info!(source = %self.source.name(), "watching configuration for changes");

        while !self.is_closed() {
            let Some(watcher) = self.watcher.as_mut() else {
                break;
            };
            match watcher.wait_for_change() {
                Ok(()) => {
                    self.handle_change();
                }
                Err(WatchError::Closed) => break,
                Err(err) => error!(error = %err, "file watcher failed"),
            }
        }

        self.close();
        debug!("configuration watch loop stopped");
    }

    /// Run [`watch`](Self::watch) on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(mut self) -> Result<(ReloadHandle, JoinHandle<()>)> {
        let handle = self.handle();
        let join = thread::Builder::new()
            .name("config-reloader".to_string())
            .spawn(move || self.watch())
            .map_err(ReloadError::Spawn)?;
        Ok((handle, join))
    }

    /// Stop watching and release the watcher. Idempotent.
    pub fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        if self.watcher.take().is_some() {
            self.closer.close();
        }
    }
}

impl Drop for ReloadEngine {
    fn drop(&mut self) {
        self.close();
    }
}
