//! Polling fallback for platforms without native file notifications.

use super::change::{ChangeWatcher, Closer};
use crate::error::WatchError;
use parking_lot::{Condvar, Mutex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: SystemTime,
    len: u64,
}

fn fingerprint(path: &Path) -> std::io::Result<Fingerprint> {
    let meta = fs::metadata(path)?;
    Ok(Fingerprint {
        modified: meta.modified()?,
        len: meta.len(),
    })
}

#[derive(Default)]
struct Shutdown {
    closed: Mutex<bool>,
    wake: Condvar,
}

/// Detects changes by stat'ing the file on a fixed interval.
///
/// A change is a difference in modification time or length since the last
/// check. Stat failures are reported once per outage rather than on every
/// tick.
pub struct PollingWatcher {
    path: PathBuf,
    interval: Duration,
    last_seen: Option<Fingerprint>,
    failing: bool,
    shutdown: Arc<Shutdown>,
}

impl PollingWatcher {
    /// Watch `path`, checking every `interval`.
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        let path = path.into();
        let last_seen = fingerprint(&path).ok();
        Self {
            path,
            interval,
            last_seen,
            failing: false,
            shutdown: Arc::new(Shutdown::default()),
        }
    }

    /// Time between checks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep one interval; `true` if closed meanwhile.
    fn sleep_or_close(&self) -> bool {
        let mut closed = self.shutdown.closed.lock();
        if !*closed {
            self.shutdown.wake.wait_for(&mut closed, self.interval);
        }
        *closed
    }
}

impl ChangeWatcher for PollingWatcher {
    fn wait_for_change(&mut self) -> Result<(), WatchError> {
        loop {
            if self.sleep_or_close() {
                return Err(WatchError::Closed);
            }

            match fingerprint(&self.path) {
                Ok(current) => {
                    self.failing = false;
                    if self.last_seen != Some(current) {
                        self.last_seen = Some(current);
                        return Ok(());
                    }
                }
                Err(e) => {
                    self.last_seen = None;
                    if !self.failing {
                        self.failing = true;
                        return Err(WatchError::Backend(format!(
                            "failed to stat {}: {}",
                            self.path.display(),
                            e
                        )));
                    }
                }
            }
        }
    }

    fn closer(&self) -> Closer {
        let shutdown = Arc::clone(&self.shutdown);
        Closer::new(move || {
            *shutdown.closed.lock() = true;
            shutdown.wake.notify_all();
        })
    }
}
