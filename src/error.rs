//! Pool error types.
//!
//! [`PoolError`] is the central error type of the crate. Every variant is
//! synchronous and terminal for the call that produced it; nothing is
//! retried internally.

use crate::domain::ClientId;

/// Errors raised by the address codec and the pool manager.
///
/// # Error Code Ranges
///
/// | Range     | Category             |
/// |-----------|----------------------|
/// | 1000–1999 | Address / parsing    |
/// | 2000–2999 | Handle bookkeeping   |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The connection string does not use the `redis` scheme.
    #[error("unknown protocol: {0:?}")]
    InvalidScheme(String),

    /// The connection string has a scheme we accept but an unusable
    /// authority (e.g. a non-numeric port).
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A handle was released that neither registry knows about: either it
    /// was already released or it came from another pool.
    #[error("cannot release unknown client {0}")]
    UnknownHandle(ClientId),
}

impl PoolError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidScheme(_) => 1001,
            Self::InvalidAddress(_) => 1002,
            Self::UnknownHandle(_) => 2001,
        }
    }
}
