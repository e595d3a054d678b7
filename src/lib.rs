//! # hotswap-props
//!
//! Selective hot-reload of a server's properties file.
//!
//! ## Overview
//!
//! Long-running servers usually read their configuration once at startup.
//! `hotswap-props` keeps a small, pre-approved set of keys (credentials, by
//! default) live: when the file changes on disk, the reload engine
//!
//! - ignores notifications that do not advance the file's modification time,
//! - diffs the new content against the last accepted snapshot,
//! - applies changed reloadable keys and drops removed keys,
//! - logs a warning for every other changed key and leaves it alone,
//! - pushes the result to the live configuration in one step.
//!
//! Failures never escape the watch loop: the process keeps its last good
//! configuration and the error is logged through `tracing`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotswap_props::prelude::*;
//! use std::sync::Arc;
//!
//! # fn example() -> hotswap_props::error::Result<()> {
//! let live = Arc::new(LiveProperties::new(PropertySnapshot::new()));
//!
//! let engine = ReloadEngine::builder()
//!     .with_conf_root("/var/lib/db/conf")
//!     .build(Arc::clone(&live))?;
//! let (handle, _join) = engine.spawn()?;
//!
//! // Lock-free reads of the current value
//! let password = live.value_of(PropertyKey::PgPassword);
//!
//! // At shutdown
//! handle.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `file-watch` (default): native OS notifications through `notify`. Without
//!   it, the polling watcher is used.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod notify;
pub mod settings;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        ConfigurationSink, LiveProperties, PropertyKey, PropertySnapshot, ReloadEngine,
        ReloadEngineBuilder, ReloadHandle, ReloadOutcome, ReloadableKeySet,
    };
    pub use crate::error::{ReloadError, Result, ValidationError};
    pub use crate::notify::WatchStrategy;
    pub use crate::settings::ReloaderSettings;
}
