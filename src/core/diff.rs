//! Three-way diff between the accepted snapshot and a freshly read one.

use super::keys::{KeyClass, KeyPolicy};
use super::snapshot::PropertySnapshot;
use tracing::{info, warn};

/// The outcome of comparing two snapshots under a [`KeyPolicy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Reloadable keys whose new value is staged, in file order.
    pub updated: Vec<(String, String)>,
    /// Keys present before but missing from the new file.
    pub removed: Vec<String>,
    /// Recognized keys that changed but cannot be hot-reloaded.
    pub rejected: Vec<String>,
}

impl ChangeSet {
    /// Compare `accepted` against `incoming`.
    ///
    /// Additions and modifications go through the policy: unknown keys are
    /// skipped silently, fixed keys are rejected with a warning. Removals are
    /// not gated: any accepted key missing from `incoming` is dropped, even a
    /// fixed one.
    pub fn between(accepted: &PropertySnapshot, incoming: &PropertySnapshot, policy: &KeyPolicy) -> Self {
        let mut changes = ChangeSet::default();

        for (key, value) in incoming.iter() {
            if accepted.get(key) == Some(value) {
                continue;
            }
            match policy.classify(key) {
                KeyClass::Unknown => {}
                KeyClass::Reloadable => {
                    info!(key, "loaded new value of {}", key);
                    changes.updated.push((key.to_string(), value.to_string()));
                }
                KeyClass::Fixed => {
                    warn!(
                        key,
                        "property {} was modified in the config file but cannot be reloaded. ignoring new value",
                        key
                    );
                    changes.rejected.push(key.to_string());
                }
            }
        }

        changes.removed = accepted
            .keys()
            .filter(|key| !incoming.contains_key(key))
            .map(str::to_string)
            .collect();

        changes
    }

    /// Whether anything would be written to the accepted snapshot.
    pub fn has_changes(&self) -> bool {
        !self.updated.is_empty() || !self.removed.is_empty()
    }

    /// Commit staged values and removals into `snapshot` in place.
    pub fn apply_to(&self, snapshot: &mut PropertySnapshot) {
        for (key, value) in &self.updated {
            snapshot.insert(key.as_str(), value.as_str());
        }
        for key in &self.removed {
            snapshot.remove(key);
        }
    }
}
