//! Reference-counted storage for shared connections.
//!
//! [`PoolRegistry`] keeps at most one underlying connection per
//! [`PoolKey`]. Every shared allocation for a key bumps the entry's
//! refcount and returns the same handle; the release that brings the count
//! to zero quits the client and drops the entry.
//!
//! The registry has no lock of its own. The
//! [`crate::service::PoolManager`] serializes all access to it.

use std::collections::HashMap;

use serde::Serialize;

use super::pool_entry::{PoolEntry, PoolEntrySummary};
use super::{Address, ClientHandle, ClientId, Connector, PoolKey};

/// Handle returned by [`PoolRegistry::acquire`] with the entry's refcount
/// after the acquisition.
#[derive(Debug, Clone)]
pub struct PoolLease {
    /// Shared handle for the key.
    pub handle: ClientHandle,
    /// Refcount after this acquisition.
    pub refcount: usize,
}

impl PoolLease {
    /// Returns `true` if this acquisition opened the connection.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.refcount == 1
    }
}

/// What a successful release did to the underlying connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// Other consumers still hold the shared connection.
    Retained {
        /// References left after this release.
        refcount: usize,
    },
    /// The connection was quit and forgotten.
    Closed,
}

/// Shared connections keyed by [`PoolKey`].
///
/// An auxiliary `ClientId → PoolKey` index makes release by identity O(1).
#[derive(Debug, Default)]
pub struct PoolRegistry {
    entries: HashMap<PoolKey, PoolEntry>,
    index: HashMap<ClientId, PoolKey>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a reference on the connection for `key`, opening it through
    /// `connector` if there is none yet.
    ///
    /// `address` is only used when a new connection is opened; a reused
    /// handle keeps the address it was first opened with.
    pub fn acquire(
        &mut self,
        key: PoolKey,
        address: Address,
        connector: &dyn Connector,
    ) -> PoolLease {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.refcount = entry.refcount.saturating_add(1);
            return PoolLease {
                handle: entry.handle.clone(),
                refcount: entry.refcount,
            };
        }

        let handle = ClientHandle::connect(address, connector);
        self.index.insert(handle.id(), key.clone());
        self.entries
            .insert(key.clone(), PoolEntry::new(key, handle.clone()));
        PoolLease {
            handle,
            refcount: 1,
        }
    }

    /// Drops one reference on the entry holding `handle`.
    ///
    /// Returns `None` if the handle is not in this registry, which is not an
    /// error: the caller goes on to try the exclusive registry.
    pub fn try_release(&mut self, handle: &ClientHandle) -> Option<ReleaseOutcome> {
        let id = handle.id();
        let remaining = {
            let key = self.index.get(&id)?;
            let entry = self.entries.get_mut(key)?;
            entry.refcount = entry.refcount.saturating_sub(1);
            entry.refcount
        };

        if remaining > 0 {
            return Some(ReleaseOutcome::Retained {
                refcount: remaining,
            });
        }

        let key = self.index.remove(&id)?;
        if let Some(entry) = self.entries.remove(&key) {
            entry.handle.quit();
        }
        Some(ReleaseOutcome::Closed)
    }

    /// Returns the entry stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &PoolKey) -> Option<&PoolEntry> {
        self.entries.get(key)
    }

    /// Returns `true` if `handle` belongs to a live entry.
    #[must_use]
    pub fn contains(&self, handle: &ClientHandle) -> bool {
        self.index.contains_key(&handle.id())
    }

    /// Returns `{key, refcount}` for every entry, sorted by key.
    #[must_use]
    pub fn summaries(&self) -> Vec<PoolEntrySummary> {
        let mut summaries: Vec<PoolEntrySummary> =
            self.entries.values().map(PoolEntrySummary::from).collect();
        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        summaries
    }

    /// Number of live shared connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no shared connection is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
