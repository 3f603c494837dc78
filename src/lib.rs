//! # redis-refpool
//!
//! Shared and exclusive Redis client handles multiplexed over as few
//! physical connections as possible.
//!
//! Consumers ask the [`service::PoolManager`] for a handle by connection
//! string. Ordinary requests for the same host and port share one
//! reference-counted connection; exclusive requests (blocking or
//! subscribe-style work) get a connection of their own. The Redis protocol
//! itself is delegated to a [`domain::Connector`] supplied by the caller.
//!
//! ## Architecture
//!
//! ```text
//! Consumers
//!     │  allocate(dsn, options) / release(handle)
//!     │
//!     ├── PoolManager (service/) ──── EventBus (domain/) ── event logger
//!     │
//!     ├── AddressCodec, KeyPolicy (domain/)
//!     ├── PoolRegistry       (domain/)  refcounted, one per key
//!     ├── ExclusiveRegistry  (domain/)  one per consumer
//!     │
//!     └── Connector / Client (caller-provided)
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod service;

pub use config::PoolConfig;
pub use domain::{Address, AllocOptions, Client, ClientHandle, Connector, ReleaseOutcome};
pub use error::PoolError;
pub use service::PoolManager;
