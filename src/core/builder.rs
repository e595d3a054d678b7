//! Builder for constructing ReloadEngine instances.

use super::engine::ReloadEngine;
use super::keys::{KeyCatalog, KeyPolicy, ReloadableKeySet, ServerKeys};
use super::sink::ConfigurationSink;
use crate::error::{ReloadError, Result};
use crate::notify::{WatchStrategy, watcher_for};
use crate::settings::ReloaderSettings;
use crate::sources::{DEFAULT_FILE_NAME, FileSource};
use std::path::PathBuf;

/// Builder for a [`ReloadEngine`] watching a properties file on disk.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example() -> Result<()> {
/// let live = Arc::new(LiveProperties::new(PropertySnapshot::new()));
///
/// let engine = ReloadEngine::builder()
///     .with_conf_root("/var/lib/db/conf")
///     .with_watch_strategy(WatchStrategy::Polling {
///         interval: Duration::from_secs(5),
///     })
///     .build(live)?;
/// # Ok(())
/// # }
/// ```
pub struct ReloadEngineBuilder {
    conf_root: PathBuf,
    file_name: String,
    config_file: Option<PathBuf>,
    strategy: WatchStrategy,
    reloadable: ReloadableKeySet,
    catalog: Box<dyn KeyCatalog>,
}

impl ReloadEngineBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            conf_root: PathBuf::from("conf"),
            file_name: DEFAULT_FILE_NAME.to_string(),
            config_file: None,
            strategy: WatchStrategy::Auto,
            reloadable: ReloadableKeySet::server_auth(),
            catalog: Box::new(ServerKeys),
        }
    }

    /// Directory holding the configuration file.
    pub fn with_conf_root(mut self, conf_root: impl Into<PathBuf>) -> Self {
        self.conf_root = conf_root.into();
        self
    }

    /// Name of the configuration file inside the root (default `server.conf`).
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Watch an explicit file instead of `<conf_root>/<file_name>`.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Choose the notification backend.
    pub fn with_watch_strategy(mut self, strategy: WatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the set of keys that may be hot-reloaded.
    pub fn with_reloadable_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reloadable = ReloadableKeySet::new(keys);
        self
    }

    /// Replace the catalog of recognized keys (default: [`ServerKeys`]).
    pub fn with_key_catalog(mut self, catalog: impl KeyCatalog + 'static) -> Self {
        self.catalog = Box::new(catalog);
        self
    }

    /// Apply loaded [`ReloaderSettings`].
    pub fn with_settings(mut self, settings: &ReloaderSettings) -> Self {
        self.conf_root = settings.conf_root.clone();
        self.file_name = settings.file_name.clone();
        self.strategy = settings.watch_strategy();
        if !settings.reloadable_keys.is_empty() {
            self.reloadable = ReloadableKeySet::new(settings.reloadable_keys.iter().cloned());
        }
        self
    }

    /// The file the engine will watch.
    pub fn config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.conf_root.join(&self.file_name))
    }

    /// Build the engine.
    ///
    /// The file does not need to be readable yet; the initial load happens in
    /// [`ReloadEngine::watch`] / [`ReloadEngine::start`].
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be made absolute or the watcher
    /// cannot be created.
    pub fn build(self, sink: impl ConfigurationSink + 'static) -> Result<ReloadEngine> {
        let requested = self.config_path();
        let path = std::path::absolute(&requested).map_err(|e| ReloadError::Io {
            path: requested,
            source: e,
        })?;

        let watcher = watcher_for(&path, self.strategy)?;
        let policy = KeyPolicy::from_boxed(self.catalog, self.reloadable);

        tracing::debug!(path = %path.display(), strategy = ?self.strategy, "built configuration reloader");
        Ok(ReloadEngine::new(FileSource::new(path), watcher, sink, policy))
    }
}

impl Default for ReloadEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadEngine {
    /// Create a new builder for constructing a reload engine.
    pub fn builder() -> ReloadEngineBuilder {
        ReloadEngineBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LiveProperties, PropertySnapshot};
    use crate::settings::WatchMode;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_path() {
        let builder = ReloadEngineBuilder::new().with_conf_root("/opt/db/conf");
        assert_eq!(builder.config_path(), PathBuf::from("/opt/db/conf/server.conf"));

        let builder = builder.with_file_name("custom.conf");
        assert_eq!(builder.config_path(), PathBuf::from("/opt/db/conf/custom.conf"));
    }

    #[test]
    fn test_explicit_file_wins() {
        let builder = ReloadEngineBuilder::new()
            .with_conf_root("/opt/db/conf")
            .with_config_file("/etc/db.properties");
        assert_eq!(builder.config_path(), PathBuf::from("/etc/db.properties"));
    }

    #[test]
    fn test_with_settings() {
        let settings = ReloaderSettings {
            conf_root: PathBuf::from("/srv/conf"),
            file_name: "db.conf".to_string(),
            watch_mode: WatchMode::Polling,
            poll_interval_ms: 250,
            reloadable_keys: vec!["app.token".to_string()],
            ..ReloaderSettings::default()
        };

        let builder = ReloadEngineBuilder::new().with_settings(&settings);
        assert_eq!(builder.config_path(), PathBuf::from("/srv/conf/db.conf"));
        assert_eq!(
            builder.strategy,
            WatchStrategy::Polling {
                interval: Duration::from_millis(250)
            }
        );
        assert!(builder.reloadable.contains("app.token"));
        assert!(!builder.reloadable.contains("pg.user"));
    }

    #[test]
    fn test_empty_settings_keys_keep_defaults() {
        let builder = ReloadEngineBuilder::new().with_settings(&ReloaderSettings::default());
        assert_eq!(builder.reloadable, ReloadableKeySet::server_auth());
    }

    #[test]
    fn test_build_and_start() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("server.conf"), "pg.user=admin\n").unwrap();

        let mut engine = ReloadEngine::builder()
            .with_conf_root(temp_dir.path())
            .with_watch_strategy(WatchStrategy::Polling {
                interval: Duration::from_millis(10),
            })
            .build(LiveProperties::new(PropertySnapshot::new()))
            .unwrap();

        engine.start().unwrap();
        assert_eq!(engine.accepted().and_then(|p| p.get("pg.user")), Some("admin"));
    }
}
