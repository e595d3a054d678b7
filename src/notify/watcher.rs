//! Native file watching through the `notify` crate.

use super::change::{ChangeWatcher, Closer};
use crate::error::{ReloadError, Result, WatchError};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcherApi};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Messages delivered from the notify callback to the waiting thread.
#[derive(Debug)]
enum Signal {
    Changed,
    Failed(String),
    Closed,
}

/// Write/create events for the watched file, or a rescan request.
///
/// A rescan (e.g. after an inotify queue overflow) carries no paths and may
/// hide a real change, so it always wakes the waiter.
fn is_relevant(event: &Event, file_name: &OsStr) -> bool {
    if event.need_rescan() {
        return true;
    }
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

/// Watcher backed by OS notifications (inotify, FSEvents/kqueue, ...).
///
/// Watches the file's parent directory so that editors replacing the file
/// through a rename are still seen, and keeps only create/modify events for
/// the watched file name. Events arriving within the debounce window after
/// the first one are folded into a single wake-up.
///
/// # Panics
///
/// [`wait_for_change`](ChangeWatcher::wait_for_change) blocks on a tokio
/// channel and panics if called from inside an async runtime. Run it on a
/// dedicated thread (see [`ReloadEngine::spawn`](crate::core::ReloadEngine::spawn))
/// or in `spawn_blocking`.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::notify::{ChangeWatcher, NotifyWatcher};
/// use std::time::Duration;
///
/// # fn example() -> hotswap_props::error::Result<()> {
/// let mut watcher = NotifyWatcher::new("/var/lib/db/conf/server.conf", Duration::from_millis(50))?;
///
/// while watcher.wait_for_change().is_ok() {
///     println!("server.conf changed");
/// }
/// # Ok(())
/// # }
/// ```
pub struct NotifyWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<Signal>,
    tx: mpsc::UnboundedSender<Signal>,
    path: PathBuf,
    debounce: Duration,
    closed: bool,
}

impl NotifyWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has no parent directory or the
    /// underlying watcher cannot be created.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> Result<Self> {
        let path = std::path::absolute(path.as_ref()).map_err(|e| ReloadError::Io {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let dir = path
            .parent()
            .ok_or_else(|| WatchError::Backend(format!("{} has no parent directory", path.display())))?
            .to_path_buf();
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| WatchError::Backend(format!("{} has no file name", path.display())))?
            .to_os_string();

        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let signal = match res {
                Ok(event) => {
                    if !is_relevant(&event, &file_name) {
                        return;
                    }
                    Signal::Changed
                }
                Err(e) => Signal::Failed(e.to_string()),
            };
            let _ = event_tx.send(signal);
        })
        .map_err(|e| WatchError::Backend(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Backend(format!("Failed to watch {}: {}", dir.display(), e)))?;

        tracing::debug!(path = %path.display(), "native file watcher started");

        Ok(Self {
            _watcher: watcher,
            rx,
            tx,
            path,
            debounce,
            closed: false,
        })
    }

    /// The watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the debounce duration for this watcher.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce
    }

    /// Fold queued signals into the current wake-up.
    fn drain(&mut self) {
        while let Ok(signal) = self.rx.try_recv() {
            match signal {
                Signal::Changed => {}
                Signal::Failed(reason) => {
                    tracing::debug!(reason = %reason, "watch error folded into pending change")
                }
                Signal::Closed => {
                    self.closed = true;
                    break;
                }
            }
        }
    }
}

impl ChangeWatcher for NotifyWatcher {
    fn wait_for_change(&mut self) -> std::result::Result<(), WatchError> {
        if self.closed {
            return Err(WatchError::Closed);
        }

        match self.rx.blocking_recv() {
            Some(Signal::Changed) => {}
            Some(Signal::Failed(reason)) => return Err(WatchError::Backend(reason)),
            Some(Signal::Closed) | None => {
                self.closed = true;
                return Err(WatchError::Closed);
            }
        }

        if !self.debounce.is_zero() {
            std::thread::sleep(self.debounce);
        }
        self.drain();

        Ok(())
    }

    fn closer(&self) -> Closer {
        let tx = self.tx.clone();
        Closer::new(move || {
            let _ = tx.send(Signal::Closed);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn config_file(temp_dir: &TempDir) -> PathBuf {
        let path = temp_dir.path().join("server.conf");
        fs::write(&path, "pg.user=admin\n").unwrap();
        path
    }

    #[test]
    fn test_event_filter() {
        use notify::event::{AccessKind, CreateKind, DataChange, Flag, ModifyKind};

        let name = OsStr::new("server.conf");
        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/conf/server.conf"));
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/conf/server.conf"));
        let sibling = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/conf/log.conf"));
        let access = Event::new(EventKind::Access(AccessKind::Read)).add_path(PathBuf::from("/conf/server.conf"));
        let rescan = Event::new(EventKind::Other).set_flag(Flag::Rescan);

        assert!(is_relevant(&modify, name));
        assert!(is_relevant(&create, name));
        assert!(!is_relevant(&sibling, name));
        assert!(!is_relevant(&access, name));
        assert!(is_relevant(&rescan, name));
    }

    #[test]
    fn test_watcher_creation() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_file(&temp_dir);

        let watcher = NotifyWatcher::new(&path, Duration::from_millis(100)).unwrap();
        assert_eq!(watcher.debounce_duration(), Duration::from_millis(100));
        assert!(watcher.path().is_absolute());
    }

    #[test]
    fn test_watch_nonexistent_directory() {
        let result = NotifyWatcher::new("/nonexistent/dir/server.conf", Duration::from_millis(10));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_change_wakes_waiter() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_file(&temp_dir);
        let mut watcher = NotifyWatcher::new(&path, Duration::from_millis(20)).unwrap();

        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            fs::write(&path, "pg.user=reporting\n").unwrap();
        });

        assert_eq!(watcher.wait_for_change(), Ok(()));
        writer.join().unwrap();
    }

    #[test]
    fn test_sibling_files_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_file(&temp_dir);
        let sibling = temp_dir.path().join("log.conf");
        let mut watcher = NotifyWatcher::new(&path, Duration::ZERO).unwrap();
        let closer = watcher.closer();

        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            fs::write(&sibling, "level=debug\n").unwrap();
            thread::sleep(Duration::from_millis(200));
            closer.close();
        });

        // The sibling write never wakes us; only the close does
        assert_eq!(watcher.wait_for_change(), Err(WatchError::Closed));
        writer.join().unwrap();
    }

    #[test]
    fn test_close_unblocks_wait() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_file(&temp_dir);
        let mut watcher = NotifyWatcher::new(&path, Duration::ZERO).unwrap();
        let closer = watcher.closer();

        let closing = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            closer.close();
        });

        assert_eq!(watcher.wait_for_change(), Err(WatchError::Closed));
        assert_eq!(watcher.wait_for_change(), Err(WatchError::Closed));
        closing.join().unwrap();
    }
}
