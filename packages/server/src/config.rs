//! Server settings read from the environment at startup.

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors in the server's own settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `PORT` is not a valid port number.
    #[error("Invalid PORT '{value}'")]
    InvalidPort {
        /// The rejected value.
        value: String,
    },
    /// `RESPONSE_CACHE_CAPACITY` is not a positive integer.
    #[error("Invalid RESPONSE_CACHE_CAPACITY '{value}'")]
    InvalidCacheCapacity {
        /// The rejected value.
        value: String,
    },
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Public origin used for absolute sitemap URLs (`SITE_URL`).
    pub site_url: String,
    /// Shared secret for `POST /api/revalidate` (`REVALIDATE_TOKEN`).
    /// Revalidation is disabled when unset.
    pub revalidate_token: Option<String>,
    /// Maximum number of cached listing responses
    /// (`RESPONSE_CACHE_CAPACITY`).
    pub cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            site_url: String::new(),
            revalidate_token: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Reads `BIND_ADDR`, `PORT`, `SITE_URL`, `REVALIDATE_TOKEN` and
    /// `RESPONSE_CACHE_CAPACITY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `PORT` or `RESPONSE_CACHE_CAPACITY` is
    /// set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the settings from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `PORT` or `RESPONSE_CACHE_CAPACITY` is
    /// set but unparseable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            None => DEFAULT_PORT,
        };

        let cache_capacity = match var("RESPONSE_CACHE_CAPACITY") {
            Some(value) => match value.parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => return Err(ConfigError::InvalidCacheCapacity { value }),
            },
            None => DEFAULT_CACHE_CAPACITY,
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port,
            site_url: var("SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            revalidate_token: var("REVALIDATE_TOKEN"),
            cache_capacity,
        })
    }
}
