//! Cache and mutation settings read from the environment.

use std::time::Duration;

use tasklists_events::bus::DEFAULT_CAPACITY;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Query cache configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched entry is served without refetching.
    pub stale_time: Duration,
    /// How long an entry may go unread before it is evicted.
    pub gc_time: Duration,
    /// Extra attempts for a failed read.
    pub query_retries: u32,
    /// Extra attempts for a failed mutation. Each attempt runs the whole
    /// optimistic protocol again.
    pub mutation_retries: u32,
    /// Buffer size of the cache event bus.
    pub event_bus_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(10 * 60),
            query_retries: 1,
            mutation_retries: 1,
            event_bus_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `CACHE_STALE_TIME_SECS` | `300`   |
    /// | `CACHE_GC_TIME_SECS`    | `600`   |
    /// | `QUERY_RETRIES`         | `1`     |
    /// | `MUTATION_RETRIES`      | `1`     |
    /// | `EVENT_BUS_CAPACITY`    | `1024`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            stale_time: Duration::from_secs(env_or(
                "CACHE_STALE_TIME_SECS",
                defaults.stale_time.as_secs(),
                "u64",
            )?),
            gc_time: Duration::from_secs(env_or(
                "CACHE_GC_TIME_SECS",
                defaults.gc_time.as_secs(),
                "u64",
            )?),
            query_retries: env_or("QUERY_RETRIES", defaults.query_retries, "u32")?,
            mutation_retries: env_or("MUTATION_RETRIES", defaults.mutation_retries, "u32")?,
            event_bus_capacity: env_or(
                "EVENT_BUS_CAPACITY",
                defaults.event_bus_capacity,
                "usize",
            )?,
        })
    }
}

fn env_or<T: std::str::FromStr>(
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse_value(name, &value, expected),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(
    name: &'static str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value: value.to_string(),
    })
}
