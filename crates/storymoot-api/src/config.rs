//! Server configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::str::FromStr;

use storymoot_core::account::AccountId;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_NOTIFICATION_CAPACITY: usize = 1024;
const MISSING_OWNER: &str = "GOVERNANCE_OWNER must be set";

/// Settings needed to start the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bootstrap owner of the governance engine (`GOVERNANCE_OWNER`).
    pub owner: AccountId,
    /// Interface to bind (`HOST`).
    pub host: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Buffered notifications per subscriber (`NOTIFICATION_CAPACITY`).
    pub notification_capacity: usize,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let owner = lookup("GOVERNANCE_OWNER")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Config(MISSING_OWNER.to_owned()))?;
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        let capacity = parse_var::<NonZeroUsize>(&lookup, "NOTIFICATION_CAPACITY")?
            .map_or(DEFAULT_NOTIFICATION_CAPACITY, NonZeroUsize::get);

        Ok(Self {
            owner: AccountId::from(owner),
            host,
            port,
            notification_capacity: capacity,
        })
    }

    /// Returns the address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host` and `port` do not form a socket
    /// address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT: {e}")))
    }
}

/// Parses `name` if it is set.
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(name)
        .map(|raw| raw.trim().parse::<T>())
        .transpose()
        .map_err(|e| AppError::Config(format!("{name} is invalid: {e}")))
}
