//! Pool manager: the single entry point for allocating and releasing
//! client handles.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::config::PoolConfig;
use crate::domain::{
    Address, AddressCodec, AllocOptions, ClientHandle, Connector, EventBus, ExclusiveRegistry,
    KeyPolicy, ModeQualifiedKeys, PoolEvent, PoolKey, PoolRegistry, PoolSnapshot,
    ReleaseOutcome,
};
use crate::error::PoolError;

/// Both registries, guarded together so every allocate / release is one
/// atomic step.
#[derive(Debug, Default)]
struct PoolState {
    shared: PoolRegistry,
    exclusive: ExclusiveRegistry,
}

impl PoolState {
    fn len(&self) -> usize {
        self.shared.len() + self.exclusive.len()
    }
}

/// Coordinates the address codec, the shared and exclusive registries and
/// the event bus.
///
/// Every call follows the pattern: parse → lock → mutate one registry entry
/// → unlock → emit events → return. There is no global instance; wrap the
/// manager in an [`Arc`] to share it.
///
/// # Concurrency
///
/// One [`tokio::sync::Mutex`] covers both registries, so two concurrent
/// allocations for a new key open exactly one connection, and two
/// concurrent releases of the last two references close it exactly once.
#[derive(Debug)]
pub struct PoolManager {
    codec: AddressCodec,
    key_policy: Arc<dyn KeyPolicy>,
    connector: Arc<dyn Connector>,
    event_bus: EventBus,
    state: Mutex<PoolState>,
}

impl PoolManager {
    /// Creates an empty pool using `connector` to open connections.
    #[must_use]
    pub fn new(config: &PoolConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            codec: AddressCodec::from_config(config),
            key_policy: Arc::new(ModeQualifiedKeys::default()),
            connector,
            event_bus: EventBus::new(config.event_bus_capacity),
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Replaces the shared pooling key policy.
    #[must_use]
    pub fn with_key_policy(mut self, key_policy: Arc<dyn KeyPolicy>) -> Self {
        self.key_policy = key_policy;
        self
    }

    /// Publishes events on an existing bus instead of a private one.
    #[must_use]
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    /// Returns the event bus allocations are published on.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Parses a connection string with this pool's defaults.
    ///
    /// # Errors
    ///
    /// See [`AddressCodec::parse`].
    pub fn parse(&self, dsn: &str) -> Result<Address, PoolError> {
        self.codec.parse(dsn)
    }

    /// Formats an address as its canonical connection string.
    #[must_use]
    pub fn format(&self, address: &Address) -> String {
        self.codec.format(address)
    }

    /// Returns a handle for `dsn`.
    ///
    /// With `options.exclusive` a brand-new connection is opened for the
    /// caller alone. Otherwise the shared connection for the derived pool
    /// key is reused, or opened if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidScheme`] or [`PoolError::InvalidAddress`]
    /// if `dsn` cannot be parsed. Nothing is published or opened then.
    pub async fn allocate(
        &self,
        dsn: &str,
        options: AllocOptions,
    ) -> Result<ClientHandle, PoolError> {
        let address = self.codec.parse(dsn)?;

        tracing::debug!(
            dsn,
            exclusive = options.exclusive,
            subscriber = options.subscriber,
            "allocating client"
        );
        let _ = self.event_bus.publish(PoolEvent::Allocated {
            dsn: dsn.to_string(),
            options,
            timestamp: Utc::now(),
        });

        let mut state = self.state.lock().await;

        if options.exclusive {
            let handle = state.exclusive.acquire(address, self.connector.as_ref());
            let length = state.len();
            drop(state);

            self.opened(&handle, None, length);
            return Ok(handle);
        }

        let key = self.key_policy.pool_key(&address, &options);
        let lease = state
            .shared
            .acquire(key.clone(), address, self.connector.as_ref());
        let length = state.len();
        drop(state);

        if lease.is_new() {
            self.opened(&lease.handle, Some(key), length);
        } else {
            tracing::debug!(
                client_id = %lease.handle.id(),
                key = %key,
                refcount = lease.refcount,
                "reusing shared connection"
            );
        }
        Ok(lease.handle)
    }

    /// Gives a handle back to the pool.
    ///
    /// Shared handles lose one reference and are quit when the last one
    /// goes; exclusive handles are quit immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownHandle`] if the handle is in neither
    /// registry (already released, or allocated by another pool). State is
    /// left untouched in that case.
    pub async fn release(&self, handle: &ClientHandle) -> Result<ReleaseOutcome, PoolError> {
        let mut state = self.state.lock().await;

        let outcome = if let Some(outcome) = state.shared.try_release(handle) {
            outcome
        } else if state.exclusive.try_release(handle) {
            ReleaseOutcome::Closed
        } else {
            drop(state);
            tracing::warn!(
                client_id = %handle.id(),
                address = %handle.address(),
                "release of unknown client"
            );
            return Err(PoolError::UnknownHandle(handle.id()));
        };
        let length = state.len();
        drop(state);

        match outcome {
            ReleaseOutcome::Retained { refcount } => {
                tracing::debug!(client_id = %handle.id(), refcount, "shared reference released");
                let _ = self.event_bus.publish(PoolEvent::Released {
                    client_id: handle.id(),
                    refcount,
                    timestamp: Utc::now(),
                });
            }
            ReleaseOutcome::Closed => {
                tracing::info!(
                    client_id = %handle.id(),
                    address = %handle.address(),
                    length,
                    "connection closed"
                );
                let _ = self.event_bus.publish(PoolEvent::ConnectionClosed {
                    client_id: handle.id(),
                    address: self.codec.format(handle.address()),
                    timestamp: Utc::now(),
                });
            }
        }
        Ok(outcome)
    }

    /// Returns a read-only view of the pool.
    pub async fn describe(&self) -> PoolSnapshot {
        let state = self.state.lock().await;
        PoolSnapshot {
            length: state.len(),
            pool: state.shared.summaries(),
            exclusive: state
                .exclusive
                .addresses()
                .iter()
                .map(|address| self.codec.format(address))
                .collect(),
        }
    }

    /// Number of distinct live connections, shared plus exclusive.
    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    /// Returns `true` if no connection is open.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn opened(&self, handle: &ClientHandle, key: Option<PoolKey>, length: usize) {
        tracing::info!(
            client_id = %handle.id(),
            address = %handle.address(),
            exclusive = key.is_none(),
            length,
            "connection opened"
        );
        let _ = self.event_bus.publish(PoolEvent::ConnectionOpened {
            client_id: handle.id(),
            address: self.codec.format(handle.address()),
            key,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::client::fake::FakeConnector;

    fn make_manager() -> (PoolManager, Arc<FakeConnector>) {
        let connector = Arc::new(FakeConnector::default());
        let manager = PoolManager::new(&PoolConfig::default(), Arc::clone(&connector) as Arc<dyn Connector>);
        (manager, connector)
    }

    async fn allocate(manager: &PoolManager, dsn: &str, options: AllocOptions) -> ClientHandle {
        let Ok(handle) = manager.allocate(dsn, options).await else {
            panic!("allocation of {dsn} failed");
        };
        handle
    }

    #[tokio::test]
    async fn returns_handle_for_parsed_address() {
        let (manager, _) = make_manager();
        let handle = allocate(&manager, "redis://localhost/", AllocOptions::default()).await;
        assert_eq!(handle.address().host, "localhost");
        assert_eq!(handle.address().port, 6379);
    }

    #[tokio::test]
    async fn shared_allocations_are_deduplicated() {
        let (manager, connector) = make_manager();
        assert_eq!(manager.len().await, 0);

        let a = allocate(&manager, "redis://localhost/", AllocOptions::default()).await;
        assert_eq!(manager.len().await, 1);

        let b = allocate(&manager, "redis://localhost/", AllocOptions::default()).await;
        assert_eq!(manager.len().await, 1);
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(a.client(), b.client()));

        let c = allocate(&manager, "redis://localhost:9003/", AllocOptions::default()).await;
        assert_eq!(manager.len().await, 2);
        assert_ne!(a, c);
        assert_eq!(connector.connects(), 2);
    }

    #[tokio::test]
    async fn host_case_is_ignored_when_sharing() {
        let (manager, connector) = make_manager();

        let upper = allocate(&manager, "redis://LOCALHOST/", AllocOptions::default()).await;
        let lower = allocate(&manager, "redis://localhost/", AllocOptions::default()).await;
        assert_eq!(upper, lower);
        assert_eq!(manager.len().await, 1);
        assert_eq!(connector.connects(), 1);
    }

    #[tokio::test]
    async fn subscriber_mode_pools_separately() {
        let (manager, _) = make_manager();
        let plain = allocate(&manager, "redis://localhost/", AllocOptions::shared()).await;
        let sub = allocate(
            &manager,
            "redis://localhost/",
            AllocOptions::shared().subscriber(),
        )
        .await;
        let sub2 = allocate(
            &manager,
            "redis://localhost/",
            AllocOptions::shared().subscriber(),
        )
        .await;

        assert_ne!(plain, sub);
        assert_eq!(sub, sub2);
        assert_eq!(manager.len().await, 2);
    }

    #[tokio::test]
    async fn exclusive_allocations_are_independent() {
        let (manager, _) = make_manager();
        let options = AllocOptions::shared().exclusive();

        let a = allocate(&manager, "redis://localhost/", options).await;
        assert_eq!(manager.len().await, 1);
        let b = allocate(&manager, "redis://localhost/", options).await;
        assert_eq!(manager.len().await, 2);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn invalid_scheme_propagates_without_side_effects() {
        let (manager, connector) = make_manager();
        let mut rx = manager.event_bus().subscribe();

        let result = manager.allocate("http://foo/", AllocOptions::default()).await;
        assert_eq!(result, Err(PoolError::InvalidScheme("http".to_string())));
        assert!(manager.is_empty().await);
        assert_eq!(connector.connects(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn shared_release_is_refcounted() {
        let (manager, connector) = make_manager();
        let a = allocate(&manager, "redis://localhost:9003/", AllocOptions::default()).await;
        let b = allocate(&manager, "redis://localhost:9003/", AllocOptions::default()).await;

        let first = manager.release(&a).await;
        assert_eq!(first, Ok(ReleaseOutcome::Retained { refcount: 1 }));
        assert_eq!(manager.len().await, 1);
        assert_eq!(connector.total_quits(), 0);

        let second = manager.release(&b).await;
        assert_eq!(second, Ok(ReleaseOutcome::Closed));
        assert_eq!(manager.len().await, 0);
        assert_eq!(connector.total_quits(), 1);
    }

    #[tokio::test]
    async fn exclusive_release_closes_only_that_handle() {
        let (manager, connector) = make_manager();
        let options = AllocOptions::shared().exclusive();
        let a = allocate(&manager, "redis://localhost:9003/", options).await;
        let _b = allocate(&manager, "redis://localhost:9003/", options).await;
        assert_eq!(manager.len().await, 2);

        assert_eq!(manager.release(&a).await, Ok(ReleaseOutcome::Closed));
        assert_eq!(manager.len().await, 1);

        let (Some(first), Some(second)) = (connector.client(0), connector.client(1)) else {
            panic!("two clients recorded");
        };
        assert_eq!(first.quits(), 1);
        assert_eq!(second.quits(), 0);
    }

    #[tokio::test]
    async fn releasing_unknown_handle_fails_and_changes_nothing() {
        let (manager, connector) = make_manager();
        let (other, _) = make_manager();

        let _mine = allocate(&manager, "redis://localhost/", AllocOptions::default()).await;
        let foreign = allocate(&other, "redis://localhost/", AllocOptions::default()).await;

        let before = manager.describe().await;
        let result = manager.release(&foreign).await;
        assert_eq!(result, Err(PoolError::UnknownHandle(foreign.id())));
        assert_eq!(manager.describe().await, before);
        assert_eq!(connector.total_quits(), 0);
    }

    #[tokio::test]
    async fn double_release_of_exclusive_handle_fails() {
        let (manager, _) = make_manager();
        let handle = allocate(&manager, "redis://", AllocOptions::shared().exclusive()).await;

        assert!(manager.release(&handle).await.is_ok());
        assert!(matches!(
            manager.release(&handle).await,
            Err(PoolError::UnknownHandle(_))
        ));
    }

    #[tokio::test]
    async fn describe_reports_both_registries() {
        let (manager, _) = make_manager();
        let _ = allocate(&manager, "redis://localhost/", AllocOptions::default()).await;
        let _ = allocate(&manager, "redis://localhost/a", AllocOptions::default()).await;
        let _ = allocate(
            &manager,
            "redis://localhost:9003/jobs",
            AllocOptions::shared().exclusive(),
        )
        .await;

        let snapshot = manager.describe().await;
        assert_eq!(snapshot.length, 2);
        assert_eq!(snapshot.pool.len(), 1);
        let Some(entry) = snapshot.pool.first() else {
            panic!("expected shared entry");
        };
        assert_eq!(entry.key, PoolKey::new("localhost:6379"));
        assert_eq!(entry.refcount, 2);
        assert_eq!(snapshot.exclusive, vec!["redis://localhost:9003/jobs"]);
    }

    #[tokio::test]
    async fn allocate_emits_events() {
        let (manager, _) = make_manager();
        let mut rx = manager.event_bus().subscribe();

        let handle = allocate(
            &manager,
            "redis://localhost/",
            AllocOptions::shared().subscriber(),
        )
        .await;

        let Ok(PoolEvent::Allocated { dsn, options, .. }) = rx.recv().await else {
            panic!("expected allocated event");
        };
        assert_eq!(dsn, "redis://localhost/");
        assert!(options.subscriber);

        let Ok(PoolEvent::ConnectionOpened { client_id, key, .. }) = rx.recv().await else {
            panic!("expected connection_opened event");
        };
        assert_eq!(client_id, handle.id());
        assert_eq!(key, Some(PoolKey::new("localhost:6379:subscriber")));
    }

    #[tokio::test]
    async fn release_emits_lifecycle_events() {
        let (manager, _) = make_manager();
        let a = allocate(&manager, "redis://", AllocOptions::default()).await;
        let b = allocate(&manager, "redis://", AllocOptions::default()).await;
        let mut rx = manager.event_bus().subscribe();

        let _ = manager.release(&a).await;
        let _ = manager.release(&b).await;

        let Ok(first) = rx.recv().await else {
            panic!("expected released event");
        };
        assert_eq!(first.event_type_str(), "released");
        let Ok(second) = rx.recv().await else {
            panic!("expected connection_closed event");
        };
        assert_eq!(second.event_type_str(), "connection_closed");
        assert_eq!(second.client_id(), Some(a.id()));
    }

    #[tokio::test]
    async fn custom_key_policy_is_used() {
        #[derive(Debug)]
        struct OnePerHost;

        impl KeyPolicy for OnePerHost {
            fn pool_key(&self, address: &Address, _options: &AllocOptions) -> PoolKey {
                PoolKey::new(address.host.clone())
            }
        }

        let (manager, _) = make_manager();
        let manager = manager.with_key_policy(Arc::new(OnePerHost));

        let a = allocate(&manager, "redis://cache:1/", AllocOptions::default()).await;
        let b = allocate(&manager, "redis://cache:2/", AllocOptions::default()).await;
        assert_eq!(a, b);
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_allocations_open_one_connection() {
        let (manager, connector) = make_manager();
        let manager = Arc::new(manager);

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let manager = Arc::clone(&manager);
            tasks.push(tokio::spawn(async move {
                manager
                    .allocate("redis://localhost/", AllocOptions::default())
                    .await
            }));
        }

        let mut handles = Vec::new();
        for task in tasks {
            let Ok(Ok(handle)) = task.await else {
                panic!("allocation task failed");
            };
            handles.push(handle);
        }

        assert_eq!(connector.connects(), 1);
        assert_eq!(manager.len().await, 1);
        let snapshot = manager.describe().await;
        assert_eq!(snapshot.pool.first().map(|e| e.refcount), Some(32));

        let mut releases = Vec::new();
        for handle in handles {
            let manager = Arc::clone(&manager);
            releases.push(tokio::spawn(async move { manager.release(&handle).await }));
        }
        for release in releases {
            let Ok(Ok(_)) = release.await else {
                panic!("release task failed");
            };
        }

        assert!(manager.is_empty().await);
        assert_eq!(connector.total_quits(), 1);
    }
}
