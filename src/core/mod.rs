//! Core reload types: snapshots, key policy, the diff, and the engine.

mod builder;
mod diff;
mod engine;
mod keys;
mod live;
mod sink;
mod snapshot;

pub use builder::ReloadEngineBuilder;
pub use diff::ChangeSet;
pub use engine::{ReloadEngine, ReloadHandle, ReloadOutcome};
pub use keys::{KeyCatalog, KeyClass, KeyPolicy, PropertyKey, ReloadableKeySet, ServerKeys};
pub use live::LiveProperties;
pub use sink::ConfigurationSink;
pub use snapshot::PropertySnapshot;
