//! Type-safe client identity.
//!
//! [`ClientId`] is a newtype wrapper around [`uuid::Uuid`] (v4). One is
//! minted for every underlying connection the pool opens, and every handle
//! to that connection carries it. Handle identity is id identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for one underlying client connection.
///
/// Used as the lookup key when a handle is released, so release never
/// compares handles by value (two connections to the same address are
/// still different clients).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    /// Creates a new random `ClientId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
