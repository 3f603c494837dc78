//! Read-only view of the pool for diagnostics.

use std::fmt;

use serde::Serialize;

use super::pool_entry::PoolEntrySummary;

/// Point-in-time view returned by [`crate::service::PoolManager::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    /// Distinct live connections, shared plus exclusive.
    pub length: usize,
    /// Shared entries, sorted by key.
    pub pool: Vec<PoolEntrySummary>,
    /// Canonical addresses of exclusive connections, oldest first.
    pub exclusive: Vec<String>,
}

/// Renders as `<PoolManager { length: 2, pool: [localhost:6379 x2], exclusive: [...] }>`.
impl fmt::Display for PoolSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<PoolManager {{ length: {}, pool: [", self.length)?;
        for (i, entry) in self.pool.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} x{}", entry.key, entry.refcount)?;
        }
        write!(f, "], exclusive: [{}] }}>", self.exclusive.join(", "))
    }
}
