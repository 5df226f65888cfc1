//! Runtime configuration parsed from environment variables.
//!
//! Every variable is optional. Numeric tuning knobs fall back to their
//! defaults when absent or unparsable; only values that would make the server
//! misbehave (a bad `PORT`, zero full turns) are hard errors.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::wheel::geometry::DEFAULT_FULL_TURNS;
use crate::wheel::{DEFAULT_RESET_MS, DEFAULT_SPIN_MS, DEFAULT_TRANSITION_MS, WheelConfig};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0:?}")]
    InvalidPort(String),
    #[error("WHEEL_FULL_TURNS must be at least 1")]
    ZeroFullTurns,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Directory served at `/`, if any.
    pub static_dir: Option<PathBuf>,
    /// Names created without a password at startup.
    pub seed_people: Vec<String>,
    pub wheel: WheelConfig,
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: in-memory store when absent or empty
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `STATIC_DIR`: no static files when absent
    /// - `SEED_PEOPLE`: comma-separated names
    /// - `WHEEL_FULL_TURNS`, `WHEEL_SPIN_MS`, `WHEEL_TRANSITION_MS`,
    ///   `WHEEL_RESET_MS`: spin tuning
    ///
    /// # Errors
    ///
    /// `InvalidPort` for a non-numeric or out-of-range port;
    /// `ZeroFullTurns` for `WHEEL_FULL_TURNS=0`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match non_empty(lookup("PORT")) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let full_turns = env_parse(lookup("WHEEL_FULL_TURNS"), DEFAULT_FULL_TURNS);
        if full_turns == 0 {
            return Err(ConfigError::ZeroFullTurns);
        }
        let wheel = WheelConfig {
            full_turns,
            spin_duration: Duration::from_millis(env_parse(lookup("WHEEL_SPIN_MS"), DEFAULT_SPIN_MS)),
            transition: Duration::from_millis(env_parse(lookup("WHEEL_TRANSITION_MS"), DEFAULT_TRANSITION_MS)),
            reset_delay: Duration::from_millis(env_parse(lookup("WHEEL_RESET_MS"), DEFAULT_RESET_MS)),
        };

        Ok(Self {
            port,
            database_url: non_empty(lookup("DATABASE_URL")),
            db_max_connections: env_parse(lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS),
            static_dir: non_empty(lookup("STATIC_DIR")).map(PathBuf::from),
            seed_people: lookup("SEED_PEOPLE").map(|raw| parse_names(&raw)).unwrap_or_default(),
            wheel,
        })
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|v| !v.trim().is_empty())
}

pub(crate) fn env_parse<T>(raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Split a comma-separated name list, trimming and dropping blanks and repeats.
#[must_use]
pub fn parse_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}
