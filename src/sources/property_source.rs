//! Property source trait.

use crate::core::PropertySnapshot;
use crate::error::Result;

/// Modification time in nanoseconds since the Unix epoch.
pub type Timestamp = u64;

/// Where the reload engine reads configuration from.
///
/// Implement this trait to feed the engine from something other than a
/// file on disk (tests use in-memory sources).
pub trait PropertySource: Send {
    /// Modification time of the underlying configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be inspected.
    fn last_modified(&self) -> Result<Timestamp>;

    /// Read and parse the full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    fn load(&self) -> Result<PropertySnapshot>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;
}
