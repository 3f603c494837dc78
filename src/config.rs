//! Pool configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every setting has a default, so an
//! empty environment yields a working configuration.

/// Default host used when a connection string omits one.
pub const DEFAULT_HOST: &str = "localhost";

/// Default port used when a connection string omits one.
pub const DEFAULT_PORT: u16 = 6379;

/// Default capacity of the event bus broadcast channel.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;

/// Top-level pool configuration.
///
/// Loaded once at startup via [`PoolConfig::from_env`], or built directly
/// with [`PoolConfig::default`] and struct update syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Host filled in when a connection string has none.
    pub default_host: String,

    /// Port filled in when a connection string has none.
    pub default_port: u16,

    /// Capacity of the [`crate::domain::EventBus`] broadcast channel.
    pub event_bus_capacity: usize,
}

impl PoolConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file,
    /// then reads:
    ///
    /// - `REDIS_POOL_DEFAULT_HOST`
    /// - `REDIS_POOL_DEFAULT_PORT`
    /// - `REDIS_POOL_EVENT_BUS_CAPACITY`
    ///
    /// Missing or unparsable values fall back to the built-in defaults.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// [`PoolConfig::from_env`] delegates here with `std::env::var`.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_host = lookup("REDIS_POOL_DEFAULT_HOST")
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let default_port = parse_var(&lookup, "REDIS_POOL_DEFAULT_PORT", DEFAULT_PORT);

        let event_bus_capacity = parse_var(
            &lookup,
            "REDIS_POOL_EVENT_BUS_CAPACITY",
            DEFAULT_EVENT_BUS_CAPACITY,
        )
        .max(1);

        Self {
            default_host,
            default_port,
            event_bus_capacity,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            default_port: DEFAULT_PORT,
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
        }
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
