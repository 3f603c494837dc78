//! Underlying client collaborator and the handles the pool hands out.
//!
//! The pool never speaks the key-value protocol itself. A [`Connector`]
//! creates clients, the pool wraps each one in a [`ClientHandle`] with a
//! fresh [`ClientId`], and on teardown it calls [`Client::quit`]. No other
//! capability of the client is used here.

use std::fmt;
use std::sync::Arc;

use super::{Address, ClientId};

/// A live client connection owned by the pool.
///
/// Implementations are expected to be non-blocking: `quit` should start the
/// shutdown and return without waiting for the server.
pub trait Client: Send + Sync + fmt::Debug {
    /// Closes the connection.
    fn quit(&self);
}

/// Creates clients for an address.
///
/// Connection establishment is fire-and-forget from the pool's point of
/// view: `connect` returns a client immediately and any connection failure
/// is the client's to handle.
pub trait Connector: Send + Sync + fmt::Debug {
    /// Creates a new client for `address`.
    fn connect(&self, address: &Address) -> Arc<dyn Client>;
}

/// Handle to a pooled client.
///
/// Cloning is cheap and keeps the identity: every clone, and every handle
/// returned for the same shared pool entry, carries the same [`ClientId`]
/// and points at the same client. Equality is identity.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    address: Address,
    client: Arc<dyn Client>,
}

impl ClientHandle {
    /// Opens a new client through `connector` under a fresh id.
    pub(crate) fn connect(address: Address, connector: &dyn Connector) -> Self {
        let client = connector.connect(&address);
        Self {
            id: ClientId::new(),
            address,
            client,
        }
    }

    /// Identity of the underlying connection.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.id
    }

    /// Address the connection was opened for.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &Arc<dyn Client> {
        &self.client
    }

    pub(crate) fn quit(&self) {
        self.client.quit();
    }
}

impl PartialEq for ClientHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClientHandle {}
