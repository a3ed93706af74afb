//! Process configuration, read once from the environment at startup.
//!
//! - `SECRET_KEY` (required) - HMAC key used to sign access tokens
//! - `ALGORITHM` - `HS256`, `HS384` or `HS512` (default `HS256`)
//! - `ACCESS_TOKEN_EXPIRE_MINUTES` - token lifetime (default 30)
//! - `DATABASE_URL` - SQLite connection string (default `sqlite://app.db?mode=rwc`)
//! - `HOST` / `PORT` - bind address (default `0.0.0.0:8000`)
//! - `SEED_DEMO_USERS` - insert the demo accounts on startup (default `true`)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use secrecy::SecretString;
use thiserror::Error;

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_DATABASE_URL: &str = "sqlite://app.db?mode=rwc";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: SecretString,
    pub algorithm: Algorithm,
    pub access_token_ttl: chrono::Duration,
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub seed_demo_users: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("SECRET_KEY".into()))?;

        let algorithm = match lookup("ALGORITHM") {
            Some(raw) => parse_algorithm(&raw)?,
            None => Algorithm::HS256,
        };

        let access_token_ttl = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .and_then(chrono::Duration::try_minutes)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "ACCESS_TOKEN_EXPIRE_MINUTES".into(),
                        format!("expected a positive number of minutes, got {raw:?}"),
                    )
                })?,
            None => chrono::Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        };

        let host = match lookup("HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("HOST".into(), format!("{e}")))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("PORT".into(), format!("{e}")))?,
            None => 8000,
        };

        let seed_demo_users = match lookup("SEED_DEMO_USERS") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigError::InvalidEnvVar("SEED_DEMO_USERS".into(), raw))?,
            None => true,
        };

        Ok(Self {
            secret_key: SecretString::from(secret_key),
            algorithm,
            access_token_ttl,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            host,
            port,
            seed_demo_users,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// Tokens are signed with a shared secret, so only the HMAC family makes sense.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let invalid = || ConfigError::InvalidEnvVar("ALGORITHM".into(), raw.to_string());
    match Algorithm::from_str(raw.trim()).map_err(|_| invalid())? {
        alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) => Ok(alg),
        _ => Err(invalid()),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
