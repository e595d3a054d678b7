//! Error types for hotswap-props.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;

/// Result type alias for hotswap-props operations.
pub type Result<T> = std::result::Result<T, ReloadError>;

/// Errors that can occur while loading, watching, or applying configuration.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    /// The configuration file could not be read or stat'ed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The configuration file content is malformed.
    #[error("Failed to parse {} at line {line}: {reason}", path.display())]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// 1-based line where the offending entry starts
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// The change-notification primitive failed.
    #[error("File watching error: {0}")]
    Watch(#[from] WatchError),

    /// The live configuration rejected the snapshot.
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The live configuration failed to apply the snapshot.
    #[error("Configuration sink failed: {0}")]
    Sink(String),

    /// The watch thread could not be started.
    #[error("Failed to spawn watch thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The reloader's own settings are invalid or unreadable.
    #[error("Invalid reloader settings: {0}")]
    Settings(String),

    /// Attempted to use a feature that is not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(&'static str),
}

/// Failure reported by a [`ChangeWatcher`](crate::notify::ChangeWatcher).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchError {
    /// The watcher was closed; no further changes will be reported.
    #[error("watcher closed")]
    Closed,

    /// The underlying notification backend reported a failure.
    #[error("{0}")]
    Backend(String),
}

/// Reason a snapshot was refused by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific key has an unacceptable value.
    InvalidKey {
        /// The property key
        key: String,
        /// Why the value was refused
        reason: String,
    },
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidKey { key, reason } => {
                write!(f, "Property '{}' is invalid: {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
