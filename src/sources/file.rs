//! File-based property source.

use super::property_source::{PropertySource, Timestamp};
use super::properties;
use crate::core::PropertySnapshot;
use crate::error::{ReloadError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Name of the server configuration file inside the configuration root.
pub const DEFAULT_FILE_NAME: &str = "server.conf";

/// Reads a `.properties` file from local disk.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::sources::{FileSource, PropertySource};
///
/// let source = FileSource::in_conf_root("/var/lib/db/conf", "server.conf");
/// let props = source.load()?;
/// # Ok::<(), hotswap_props::error::ReloadError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a source reading `file_name` inside the configuration root.
    pub fn in_conf_root(conf_root: impl AsRef<Path>, file_name: impl AsRef<Path>) -> Self {
        Self::new(conf_root.as_ref().join(file_name))
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ReloadError {
        ReloadError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PropertySource for FileSource {
    fn last_modified(&self) -> Result<Timestamp> {
        let modified = fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| self.io_error(e))?;

        // Times before the epoch clamp to zero
        let nanos = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Ok(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    fn load(&self) -> Result<PropertySnapshot> {
        let bytes = fs::read(&self.path).map_err(|e| self.io_error(e))?;

        // Not UTF-8: read it as ISO-8859-1, the classic `.properties` encoding
        let text = String::from_utf8(bytes)
            .unwrap_or_else(|e| e.into_bytes().into_iter().map(char::from).collect());

        properties::parse(&text).map_err(|e| ReloadError::Parse {
            path: self.path.clone(),
            line: e.line,
            reason: e.reason,
        })
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
