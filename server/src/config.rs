//! Server configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use spookychef_core::generate::DEFAULT_RECIPE_CACHE_CAPACITY;
use spookychef_core::persona::{DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_TTL};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({message})")]
    Invalid {
        var: &'static str,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory overriding the embedded data files, if set.
    pub data_dir: Option<PathBuf>,
    pub session_capacity: u64,
    pub session_ttl: Duration,
    pub recipe_cache_capacity: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_dir: None,
            session_capacity: DEFAULT_SESSION_CAPACITY,
            session_ttl: DEFAULT_SESSION_TTL,
            recipe_cache_capacity: DEFAULT_RECIPE_CACHE_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// - `SPOOKYCHEF_BIND_ADDR` (default "0.0.0.0:3000")
    /// - `SPOOKYCHEF_DATA_DIR`: directory with data JSON overrides
    /// - `SPOOKYCHEF_SESSION_CAPACITY` (default 10000)
    /// - `SPOOKYCHEF_SESSION_TTL_SECS` (default 86400)
    /// - `SPOOKYCHEF_RECIPE_CACHE_CAPACITY` (default 1000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let lookup = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr = match lookup("SPOOKYCHEF_BIND_ADDR") {
            Some(value) => parse("SPOOKYCHEF_BIND_ADDR", &value)?,
            None => defaults.bind_addr,
        };
        let session_capacity = match lookup("SPOOKYCHEF_SESSION_CAPACITY") {
            Some(value) => parse("SPOOKYCHEF_SESSION_CAPACITY", &value)?,
            None => defaults.session_capacity,
        };
        let session_ttl = match lookup("SPOOKYCHEF_SESSION_TTL_SECS") {
            Some(value) => Duration::from_secs(parse("SPOOKYCHEF_SESSION_TTL_SECS", &value)?),
            None => defaults.session_ttl,
        };
        let recipe_cache_capacity = match lookup("SPOOKYCHEF_RECIPE_CACHE_CAPACITY") {
            Some(value) => parse("SPOOKYCHEF_RECIPE_CACHE_CAPACITY", &value)?,
            None => defaults.recipe_cache_capacity,
        };

        Ok(Self {
            bind_addr,
            data_dir: lookup("SPOOKYCHEF_DATA_DIR").map(PathBuf::from),
            session_capacity,
            session_ttl,
            recipe_cache_capacity,
        })
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        message: e.to_string(),
    })
}
