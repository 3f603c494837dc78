//! Shared pooling keys and the policy that derives them.
//!
//! The [`super::PoolRegistry`] only ever sees a [`PoolKey`]; which parts of
//! an address and which option flags go into the key is decided by a
//! [`KeyPolicy`]. The default, [`ModeQualifiedKeys`], yields `host:port`
//! plus one `:mode` suffix per active mode flag.

use std::fmt;

use serde::Serialize;

use super::{Address, AllocOptions};

/// Key identifying one shared underlying connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PoolKey(String);

impl PoolKey {
    /// Wraps an already-derived key string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides which allocations may share one underlying connection.
///
/// Two shared allocations receive the same handle iff the policy maps them
/// to equal keys.
pub trait KeyPolicy: Send + Sync + fmt::Debug {
    /// Derives the shared pooling key for an allocation.
    fn pool_key(&self, address: &Address, options: &AllocOptions) -> PoolKey;
}

/// Default policy: `host`, `port` and each mode label joined by a separator.
///
/// The host is lowercased, since DNS names are case-insensitive. The
/// namespace never takes part, so `redis://h/a` and `redis://h/b` share a
/// connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeQualifiedKeys {
    separator: String,
}

impl ModeQualifiedKeys {
    /// Creates the policy with a custom separator.
    #[must_use]
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for ModeQualifiedKeys {
    fn default() -> Self {
        Self::with_separator(":")
    }
}

impl KeyPolicy for ModeQualifiedKeys {
    fn pool_key(&self, address: &Address, options: &AllocOptions) -> PoolKey {
        let host = address.host.to_ascii_lowercase();
        let port = address.port.to_string();
        let mut parts = vec![host.as_str(), port.as_str()];
        parts.extend(options.modes());
        PoolKey(parts.join(&self.separator))
    }
}
