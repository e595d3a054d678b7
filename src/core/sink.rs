//! The live configuration object the reloader pushes accepted snapshots to.

use super::snapshot::PropertySnapshot;
use crate::error::Result;
use std::sync::Arc;

/// Receives accepted snapshots from the reload engine.
///
/// `reload` is called only from the watch loop's thread. A returned error is
/// logged by the engine and the previous snapshot stays accepted.
pub trait ConfigurationSink: Send {
    /// Apply `snapshot` to the live configuration.
    fn reload(&self, snapshot: &PropertySnapshot) -> Result<()>;
}

impl<T> ConfigurationSink for Arc<T>
where
    T: ConfigurationSink + Sync + ?Sized,
{
    fn reload(&self, snapshot: &PropertySnapshot) -> Result<()> {
        (**self).reload(snapshot)
    }
}
