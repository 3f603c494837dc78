//! Storage for connections owned by a single consumer.
//!
//! Every [`ExclusiveRegistry::acquire`] opens a brand-new connection, even
//! for an address that already has one. Entries carry no refcount: the
//! first release quits the client and removes it.

use std::collections::HashMap;

use super::{Address, ClientHandle, ClientId, Connector};

/// A connection held by exactly one consumer, with its insertion order.
#[derive(Debug)]
struct ExclusiveEntry {
    handle: ClientHandle,
    seq: u64,
}

/// Exclusively-owned connections, keyed by client identity.
#[derive(Debug, Default)]
pub struct ExclusiveRegistry {
    entries: HashMap<ClientId, ExclusiveEntry>,
    next_seq: u64,
}

impl ExclusiveRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new connection for `address` and stores it.
    pub fn acquire(&mut self, address: Address, connector: &dyn Connector) -> ClientHandle {
        let handle = ClientHandle::connect(address, connector);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.entries.insert(
            handle.id(),
            ExclusiveEntry {
                handle: handle.clone(),
                seq,
            },
        );
        handle
    }

    /// Removes and quits the connection behind `handle`.
    ///
    /// Returns `false` if the handle is not in this registry.
    pub fn try_release(&mut self, handle: &ClientHandle) -> bool {
        match self.entries.remove(&handle.id()) {
            Some(entry) => {
                entry.handle.quit();
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `handle` is held here.
    #[must_use]
    pub fn contains(&self, handle: &ClientHandle) -> bool {
        self.entries.contains_key(&handle.id())
    }

    /// Addresses of all held connections, oldest first.
    #[must_use]
    pub fn addresses(&self) -> Vec<Address> {
        let mut entries: Vec<&ExclusiveEntry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries
            .into_iter()
            .map(|entry| entry.handle.address().clone())
            .collect()
    }

    /// Number of held connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no exclusive connection is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
