//! Settings for the reloader itself, loaded with the `config` crate.

use crate::error::{ReloadError, Result};
use crate::notify::{DEFAULT_DEBOUNCE, WatchStrategy};
use crate::sources::DEFAULT_FILE_NAME;
use config::{Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Notification backend named in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchMode {
    /// Native when available, polling otherwise
    #[default]
    Auto,
    /// OS notifications only
    Native,
    /// Stat the file on an interval
    Polling,
}

/// Where the configuration file lives and how it is watched.
///
/// Every field has a default, so an empty settings file is valid.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::settings::ReloaderSettings;
/// use std::path::Path;
///
/// // reloader.toml, overridden by RELOADER_CONF_ROOT, RELOADER_WATCH_MODE, ...
/// let settings = ReloaderSettings::load(Some(Path::new("reloader.toml")), "RELOADER")?;
/// println!("watching {}", settings.config_path().display());
/// # Ok::<(), hotswap_props::error::ReloadError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReloaderSettings {
    /// Directory holding the configuration file
    pub conf_root: PathBuf,
    /// File name inside `conf_root`
    pub file_name: String,
    /// Notification backend
    pub watch_mode: WatchMode,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Native event debounce in milliseconds
    pub debounce_ms: u64,
    /// Keys allowed to change at runtime; empty keeps the built-in set
    pub reloadable_keys: Vec<String>,
}

impl Default for ReloaderSettings {
    fn default() -> Self {
        Self {
            conf_root: PathBuf::from("conf"),
            file_name: DEFAULT_FILE_NAME.to_string(),
            watch_mode: WatchMode::Auto,
            poll_interval_ms: 1000,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            reloadable_keys: Vec::new(),
        }
    }
}

impl ReloaderSettings {
    /// Load settings from an optional file, then `<PREFIX>_<FIELD>`
    /// environment variables. `reloadable_keys` in the environment is a
    /// comma-separated list.
    ///
    /// The file format is detected from its extension (`.toml`, `.yaml`,
    /// `.yml`, `.json`).
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::Settings`] if the file is missing or malformed,
    /// a value has the wrong type, or `poll_interval_ms` is zero.
    pub fn load(file: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("reloadable_keys"),
        );

        let settings: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ReloadError::Settings(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ReloadError::Settings(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.file_name.is_empty() {
            return Err(ReloadError::Settings("file_name must not be empty".to_string()));
        }
        Ok(())
    }

    /// `<conf_root>/<file_name>`.
    pub fn config_path(&self) -> PathBuf {
        self.conf_root.join(&self.file_name)
    }

    /// The watch strategy these settings describe.
    pub fn watch_strategy(&self) -> WatchStrategy {
        match self.watch_mode {
            WatchMode::Auto => WatchStrategy::Auto,
            WatchMode::Native => WatchStrategy::Native {
                debounce: Duration::from_millis(self.debounce_ms),
            },
            WatchMode::Polling => WatchStrategy::Polling {
                interval: Duration::from_millis(self.poll_interval_ms),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // A prefix no real environment sets, so only the file is read
    const PREFIX: &str = "HOTSWAP_PROPS_SETTINGS_TEST";

    #[test]
    fn test_defaults_without_file() {
        let settings = ReloaderSettings::load(None, PREFIX).unwrap();
        assert_eq!(settings, ReloaderSettings::default());
        assert_eq!(settings.config_path(), PathBuf::from("conf/server.conf"));
        assert_eq!(settings.watch_strategy(), WatchStrategy::Auto);
    }

    #[test]
    fn test_load_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reloader.toml");
        fs::write(
            &path,
            r#"
conf_root = "/var/lib/db/conf"
watch_mode = "polling"
poll_interval_ms = 250
reloadable_keys = ["pg.user", "pg.password"]
"#,
        )
        .unwrap();

        let settings = ReloaderSettings::load(Some(&path), PREFIX).unwrap();
        assert_eq!(settings.conf_root, PathBuf::from("/var/lib/db/conf"));
        assert_eq!(settings.file_name, "server.conf");
        assert_eq!(settings.reloadable_keys, vec!["pg.user", "pg.password"]);
        assert_eq!(
            settings.watch_strategy(),
            WatchStrategy::Polling {
                interval: Duration::from_millis(250)
            }
        );
    }

    #[test]
    fn test_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reloader.yaml");
        fs::write(&path, "file_name: db.conf\nwatch_mode: native\ndebounce_ms: 10\n").unwrap();

        let settings = ReloaderSettings::load(Some(&path), PREFIX).unwrap();
        assert_eq!(settings.file_name, "db.conf");
        assert_eq!(
            settings.watch_strategy(),
            WatchStrategy::Native {
                debounce: Duration::from_millis(10)
            }
        );
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reloader.toml");
        fs::write(&path, "poll_interval_ms = 0\n").unwrap();

        let result = ReloaderSettings::load(Some(&path), PREFIX);
        assert!(matches!(result, Err(ReloadError::Settings(_))));
    }

    #[test]
    fn test_missing_file_rejected() {
        let result = ReloaderSettings::load(Some(Path::new("/nonexistent/reloader.toml")), PREFIX);
        assert!(matches!(result, Err(ReloadError::Settings(_))));
    }

    #[test]
    fn test_unknown_watch_mode_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reloader.toml");
        fs::write(&path, "watch_mode = \"psychic\"\n").unwrap();

        assert!(ReloaderSettings::load(Some(&path), PREFIX).is_err());
    }
}
