//! Per-call allocation options.

use serde::{Deserialize, Serialize};

/// Options accepted by [`crate::service::PoolManager::allocate`].
///
/// Both flags default to `false`, which requests an ordinary shared
/// connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocOptions {
    /// Hand out a brand-new connection owned by this consumer alone.
    pub exclusive: bool,
    /// Pool separately from ordinary connections to the same host and port.
    ///
    /// A connection in subscribe mode cannot run regular commands, so
    /// subscribers never share with non-subscribers.
    pub subscriber: bool,
}

impl AllocOptions {
    /// Options for an ordinary shared connection.
    #[must_use]
    pub const fn shared() -> Self {
        Self {
            exclusive: false,
            subscriber: false,
        }
    }

    /// Returns a copy with `exclusive` set.
    #[must_use]
    pub const fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Returns a copy with `subscriber` set.
    #[must_use]
    pub const fn subscriber(mut self) -> Self {
        self.subscriber = true;
        self
    }

    /// Labels of the connection modes these options select, in a fixed
    /// order. Plain connections have no mode label.
    #[must_use]
    pub fn modes(&self) -> Vec<&'static str> {
        let mut modes = Vec::new();
        if self.subscriber {
            modes.push("subscriber");
        }
        modes
    }
}
