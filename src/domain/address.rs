//! Connection-string codec.
//!
//! [`AddressCodec`] turns `redis://host:port/namespace` strings into
//! [`Address`] records and back. It is pure string work: nothing here
//! touches the network.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

use crate::config::PoolConfig;
use crate::error::PoolError;

/// The only scheme the codec accepts.
pub const SCHEME: &str = "redis";

/// Normalized connection target.
///
/// Only `host` and `port` take part in shared pooling. `namespace` is
/// carried along for the consumer and shows up in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Host name or IP literal, without IPv6 brackets.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Path segment after the authority, without its leading slash.
    pub namespace: String,
}

impl Address {
    /// Creates a fully-populated address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, namespace: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            namespace: namespace.into(),
        }
    }
}

/// Canonical `redis://host:port/namespace` rendering.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{SCHEME}://[{}]:{}/{}", self.host, self.port, self.namespace)
        } else {
            write!(f, "{SCHEME}://{}:{}/{}", self.host, self.port, self.namespace)
        }
    }
}

/// Parses and formats connection strings, filling in configured defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCodec {
    default_host: String,
    default_port: u16,
}

impl AddressCodec {
    /// Creates a codec with explicit defaults.
    #[must_use]
    pub fn new(default_host: impl Into<String>, default_port: u16) -> Self {
        Self {
            default_host: default_host.into(),
            default_port,
        }
    }

    /// Creates a codec using the defaults from a [`PoolConfig`].
    #[must_use]
    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(config.default_host.clone(), config.default_port)
    }

    /// Parses `redis://[user[:pass]@][host[:port]][/namespace]`.
    ///
    /// Query strings and fragments are ignored, as is any userinfo. The
    /// namespace is the URL path without its leading slash, left
    /// percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidScheme`] when the scheme is not `redis`
    /// (or there is none) and [`PoolError::InvalidAddress`] when the URL is
    /// malformed (bad port, unterminated IPv6 literal, no `//` authority).
    pub fn parse(&self, dsn: &str) -> Result<Address, PoolError> {
        let url = Url::parse(dsn).map_err(|err| match err {
            ParseError::RelativeUrlWithoutBase => PoolError::InvalidScheme(String::new()),
            other => PoolError::InvalidAddress(format!("{other} in {dsn:?}")),
        })?;

        if url.scheme() != SCHEME {
            return Err(PoolError::InvalidScheme(url.scheme().to_string()));
        }
        if url.cannot_be_a_base() {
            return Err(PoolError::InvalidAddress(format!(
                "expected '//' after scheme in {dsn:?}"
            )));
        }

        let host = url
            .host_str()
            .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
            .filter(|host| !host.is_empty())
            .unwrap_or(&self.default_host)
            .to_string();
        let port = url.port().unwrap_or(self.default_port);
        let path = url.path();
        let namespace = path.strip_prefix('/').unwrap_or(path).to_string();

        Ok(Address {
            host,
            port,
            namespace,
        })
    }

    /// Formats an address as its canonical connection string.
    ///
    /// Always emits scheme, host, port and a leading-slash namespace, so an
    /// empty namespace yields a trailing bare slash.
    #[must_use]
    pub fn format(&self, address: &Address) -> String {
        address.to_string()
    }
}

impl Default for AddressCodec {
    fn default() -> Self {
        Self::from_config(&PoolConfig::default())
    }
}
