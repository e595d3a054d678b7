//! Recognized configuration keys and the reload policy built on them.

use std::collections::HashSet;
use std::fmt;

/// Server configuration keys understood by the host process.
///
/// Keys outside this enumeration are ignored by the reloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// `cairo.root`
    CairoRoot,
    /// `shared.worker.count`
    SharedWorkerCount,
    /// `query.timeout.sec`
    QueryTimeoutSec,
    /// `http.enabled`
    HttpEnabled,
    /// `http.bind.to`
    HttpBindTo,
    /// `http.min.enabled`
    HttpMinEnabled,
    /// `http.min.net.bind.to`
    HttpMinBindTo,
    /// `http.user`
    HttpUser,
    /// `http.password`
    HttpPassword,
    /// `pg.enabled`
    PgEnabled,
    /// `pg.net.bind.to`
    PgBindTo,
    /// `pg.user`
    PgUser,
    /// `pg.password`
    PgPassword,
    /// `pg.readonly.user.enabled`
    PgReadOnlyUserEnabled,
    /// `pg.readonly.user`
    PgReadOnlyUser,
    /// `pg.readonly.password`
    PgReadOnlyPassword,
    /// `pg.security.readonly`
    PgSecurityReadOnly,
    /// `line.tcp.enabled`
    LineTcpEnabled,
    /// `line.tcp.net.bind.to`
    LineTcpBindTo,
    /// `line.udp.enabled`
    LineUdpEnabled,
    /// `telemetry.enabled`
    TelemetryEnabled,
}

impl PropertyKey {
    /// Every recognized key.
    pub const ALL: [PropertyKey; 21] = [
        PropertyKey::CairoRoot,
        PropertyKey::SharedWorkerCount,
        PropertyKey::QueryTimeoutSec,
        PropertyKey::HttpEnabled,
        PropertyKey::HttpBindTo,
        PropertyKey::HttpMinEnabled,
        PropertyKey::HttpMinBindTo,
        PropertyKey::HttpUser,
        PropertyKey::HttpPassword,
        PropertyKey::PgEnabled,
        PropertyKey::PgBindTo,
        PropertyKey::PgUser,
        PropertyKey::PgPassword,
        PropertyKey::PgReadOnlyUserEnabled,
        PropertyKey::PgReadOnlyUser,
        PropertyKey::PgReadOnlyPassword,
        PropertyKey::PgSecurityReadOnly,
        PropertyKey::LineTcpEnabled,
        PropertyKey::LineTcpBindTo,
        PropertyKey::LineUdpEnabled,
        PropertyKey::TelemetryEnabled,
    ];

    /// The key as it appears in the configuration file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CairoRoot => "cairo.root",
            Self::SharedWorkerCount => "shared.worker.count",
            Self::QueryTimeoutSec => "query.timeout.sec",
            Self::HttpEnabled => "http.enabled",
            Self::HttpBindTo => "http.bind.to",
            Self::HttpMinEnabled => "http.min.enabled",
            Self::HttpMinBindTo => "http.min.net.bind.to",
            Self::HttpUser => "http.user",
            Self::HttpPassword => "http.password",
            Self::PgEnabled => "pg.enabled",
            Self::PgBindTo => "pg.net.bind.to",
            Self::PgUser => "pg.user",
            Self::PgPassword => "pg.password",
            Self::PgReadOnlyUserEnabled => "pg.readonly.user.enabled",
            Self::PgReadOnlyUser => "pg.readonly.user",
            Self::PgReadOnlyPassword => "pg.readonly.password",
            Self::PgSecurityReadOnly => "pg.security.readonly",
            Self::LineTcpEnabled => "line.tcp.enabled",
            Self::LineTcpBindTo => "line.tcp.net.bind.to",
            Self::LineUdpEnabled => "line.udp.enabled",
            Self::TelemetryEnabled => "telemetry.enabled",
        }
    }

    /// Look up a key by its configuration-file name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a key is a recognized configuration key at all.
///
/// Any `Fn(&str) -> bool` closure can serve as a catalog.
pub trait KeyCatalog: Send + Sync {
    /// Whether `key` is a known configuration key.
    fn is_recognized(&self, key: &str) -> bool;
}

impl<F> KeyCatalog for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_recognized(&self, key: &str) -> bool {
        self(key)
    }
}

/// Catalog recognizing exactly the [`PropertyKey`] names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerKeys;

impl KeyCatalog for ServerKeys {
    fn is_recognized(&self, key: &str) -> bool {
        PropertyKey::from_key(key).is_some()
    }
}

/// Keys that are allowed to change after startup.
///
/// Fixed at construction and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadableKeySet {
    keys: HashSet<String>,
}

impl ReloadableKeySet {
    /// Build a set from arbitrary key names.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// The PG wire-protocol credentials: primary and read-only user,
    /// password, and the read-only enable flag.
    pub fn server_auth() -> Self {
        Self::new(
            [
                PropertyKey::PgUser,
                PropertyKey::PgPassword,
                PropertyKey::PgReadOnlyUserEnabled,
                PropertyKey::PgReadOnlyUser,
                PropertyKey::PgReadOnlyPassword,
            ]
            .iter()
            .map(PropertyKey::as_str),
        )
    }

    /// Whether `key` may be hot-reloaded.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of reloadable keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key is reloadable.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for ReloadableKeySet {
    fn default() -> Self {
        Self::server_auth()
    }
}

/// How a changed key is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Not a configuration key; ignored.
    Unknown,
    /// May be applied to the live configuration.
    Reloadable,
    /// Recognized but only read at startup.
    Fixed,
}

/// Pairs a [`KeyCatalog`] with a [`ReloadableKeySet`].
pub struct KeyPolicy {
    catalog: Box<dyn KeyCatalog>,
    reloadable: ReloadableKeySet,
}

impl KeyPolicy {
    /// Create a policy from a catalog and the reloadable subset.
    pub fn new(catalog: impl KeyCatalog + 'static, reloadable: ReloadableKeySet) -> Self {
        Self {
            catalog: Box::new(catalog),
            reloadable,
        }
    }

    pub(crate) fn from_boxed(catalog: Box<dyn KeyCatalog>, reloadable: ReloadableKeySet) -> Self {
        Self {
            catalog,
            reloadable,
        }
    }

    /// Classify a key.
    pub fn classify(&self, key: &str) -> KeyClass {
        if !self.catalog.is_recognized(key) {
            KeyClass::Unknown
        } else if self.reloadable.contains(key) {
            KeyClass::Reloadable
        } else {
            KeyClass::Fixed
        }
    }

    /// The reloadable subset.
    pub fn reloadable(&self) -> &ReloadableKeySet {
        &self.reloadable
    }
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::new(ServerKeys, ReloadableKeySet::server_auth())
    }
}

impl fmt::Debug for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPolicy")
            .field("reloadable", &self.reloadable)
            .finish_non_exhaustive()
    }
}
