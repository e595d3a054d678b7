//! Insertion-ordered property snapshot.

use std::fmt;

/// A parsed configuration file: string keys to string values, in the order
/// the keys first appeared.
///
/// Equality ignores ordering: two snapshots are equal when they hold the same
/// keys with the same values.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::core::PropertySnapshot;
///
/// let mut props = PropertySnapshot::new();
/// props.insert("pg.user", "admin");
/// props.insert("http.bind.to", "0.0.0.0:9000");
///
/// assert_eq!(props.get("pg.user"), Some("admin"));
/// assert_eq!(props.keys().collect::<Vec<_>>(), ["pg.user", "http.bind.to"]);
/// ```
#[derive(Clone, Default)]
pub struct PropertySnapshot {
    entries: Vec<(String, String)>,
}

impl PropertySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Insert or replace a value, returning the previous one.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Get the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for PropertySnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for PropertySnapshot {}

impl fmt::Debug for PropertySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for PropertySnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (k, v) in iter {
            snapshot.insert(k, v);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut props = PropertySnapshot::new();
        assert_eq!(props.insert("a", "1"), None);
        props.insert("b", "2");
        assert_eq!(props.insert("a", "3"), Some("1".to_string()));

        assert_eq!(props.iter().collect::<Vec<_>>(), [("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_remove() {
        let mut props: PropertySnapshot = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(props.remove("b"), Some("2".to_string()));
        assert_eq!(props.remove("b"), None);
        assert!(!props.contains_key("b"));
        assert_eq!(props.keys().collect::<Vec<_>>(), ["a", "c"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let left: PropertySnapshot = [("a", "1"), ("b", "2")].into_iter().collect();
        let right: PropertySnapshot = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(left, right);

        let different: PropertySnapshot = [("a", "1"), ("b", "9")].into_iter().collect();
        assert_ne!(left, different);

        let superset: PropertySnapshot = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_ne!(left, superset);
    }

    #[test]
    fn test_empty() {
        let props = PropertySnapshot::new();
        assert!(props.is_empty());
        assert_eq!(props.len(), 0);
        assert_eq!(props.get("anything"), None);
    }
}
