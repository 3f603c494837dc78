//! Events describing pool activity.
//!
//! Every [`crate::service::PoolManager::allocate`] call emits
//! [`PoolEvent::Allocated`] through the [`super::EventBus`]; opening,
//! dereferencing and closing connections emit the other variants. Events are
//! informational only and never influence pool behaviour.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AllocOptions, ClientId, PoolKey};

/// Event published by the pool manager.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PoolEvent {
    /// Emitted for every allocation request that parsed successfully.
    Allocated {
        /// Connection string exactly as the caller passed it.
        dsn: String,
        /// Options the caller passed.
        options: AllocOptions,
        /// Request timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a new underlying connection is opened.
    ConnectionOpened {
        /// Identity of the new connection.
        client_id: ClientId,
        /// Canonical address of the connection.
        address: String,
        /// Shared pool key, `None` for exclusive connections.
        key: Option<PoolKey>,
        /// Timestamp of the open.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a shared reference is released but others remain.
    Released {
        /// Identity of the shared connection.
        client_id: ClientId,
        /// References left.
        refcount: usize,
        /// Release timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an underlying connection is quit.
    ConnectionClosed {
        /// Identity of the closed connection.
        client_id: ClientId,
        /// Canonical address of the connection.
        address: String,
        /// Close timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl PoolEvent {
    /// Returns the client the event concerns, if any.
    #[must_use]
    pub const fn client_id(&self) -> Option<ClientId> {
        match self {
            Self::Allocated { .. } => None,
            Self::ConnectionOpened { client_id, .. }
            | Self::Released { client_id, .. }
            | Self::ConnectionClosed { client_id, .. } => Some(*client_id),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::Allocated { .. } => "allocated",
            Self::ConnectionOpened { .. } => "connection_opened",
            Self::Released { .. } => "released",
            Self::ConnectionClosed { .. } => "connection_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_serializes_dsn_and_options() {
        let event = PoolEvent::Allocated {
            dsn: "redis://localhost/".to_string(),
            options: AllocOptions::shared().subscriber(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "allocated");
        assert!(event.client_id().is_none());

        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains(r#""event_type":"allocated""#));
        assert!(json.contains(r#""dsn":"redis://localhost/""#));
        assert!(json.contains(r#""subscriber":true"#));
    }

    #[test]
    fn client_id_accessor() {
        let id = ClientId::new();
        let event = PoolEvent::ConnectionClosed {
            client_id: id,
            address: "redis://localhost:6379/".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.client_id(), Some(id));
        assert_eq!(event.event_type_str(), "connection_closed");
    }

    #[test]
    fn exclusive_open_has_null_key() {
        let event = PoolEvent::ConnectionOpened {
            client_id: ClientId::new(),
            address: "redis://localhost:6379/".to_string(),
            key: None,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains(r#""key":null"#));
    }
}
