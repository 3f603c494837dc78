//! Reference-counted shared pool entry.

use serde::Serialize;

use super::{ClientHandle, PoolKey};

/// One shared underlying connection and the number of consumers holding it.
///
/// Lives in the [`super::PoolRegistry`] from the first allocation for its
/// key until the release that brings `refcount` to zero.
#[derive(Debug)]
pub struct PoolEntry {
    /// Key the entry is stored under (immutable after creation).
    pub key: PoolKey,

    /// Outstanding shared allocations. Always at least 1 while stored.
    pub refcount: usize,

    /// Handle returned to every consumer of this entry.
    pub handle: ClientHandle,
}

impl PoolEntry {
    /// Creates an entry holding its first reference.
    #[must_use]
    pub fn new(key: PoolKey, handle: ClientHandle) -> Self {
        Self {
            key,
            refcount: 1,
            handle,
        }
    }
}

/// `{key, refcount}` pair reported by [`crate::service::PoolManager::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolEntrySummary {
    /// Pool key.
    pub key: PoolKey,
    /// Outstanding shared allocations.
    pub refcount: usize,
}

impl From<&PoolEntry> for PoolEntrySummary {
    fn from(entry: &PoolEntry) -> Self {
        Self {
            key: entry.key.clone(),
            refcount: entry.refcount,
        }
    }
}
