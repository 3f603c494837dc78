//! Domain layer: addresses, client handles, registries and events.
//!
//! This module contains the pool's data model: the connection-string
//! codec, the key policy for shared pooling, the shared and exclusive
//! registries, and the event system.

pub mod address;
pub mod alloc_options;
pub mod client;
pub mod client_id;
pub mod event_bus;
pub mod exclusive_registry;
pub mod pool_entry;
pub mod pool_event;
pub mod pool_key;
pub mod pool_registry;
pub mod snapshot;

pub use address::{Address, AddressCodec};
pub use alloc_options::AllocOptions;
pub use client::{Client, ClientHandle, Connector};
pub use client_id::ClientId;
pub use event_bus::EventBus;
pub use exclusive_registry::ExclusiveRegistry;
pub use pool_entry::{PoolEntry, PoolEntrySummary};
pub use pool_event::PoolEvent;
pub use pool_key::{KeyPolicy, ModeQualifiedKeys, PoolKey};
pub use pool_registry::{PoolLease, PoolRegistry, ReleaseOutcome};
pub use snapshot::PoolSnapshot;
