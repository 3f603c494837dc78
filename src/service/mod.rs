//! Service layer: the pool manager facade.
//!
//! [`PoolManager`] parses connection strings, routes allocations to the
//! shared or exclusive registry, and emits events through the
//! [`super::domain::EventBus`].

pub mod pool_manager;

pub use pool_manager::PoolManager;
