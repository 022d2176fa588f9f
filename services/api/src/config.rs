//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::time::Duration;
use study_catalog_core::catalog::DEFAULT_CDN_BASE;
use tracing::Level;

use crate::web::auth::hash_password;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub cdn_base: String,
    /// Argon2 PHC string the admin password is checked against.
    pub admin_password_hash: String,
    pub allowed_origin: HeaderValue,
    pub upstream_timeout: Duration,
    pub seed_subjects: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 5u32)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Catalog Settings ---
        let cdn_base = std::env::var("CDN_BASE").unwrap_or_else(|_| DEFAULT_CDN_BASE.to_string());
        let seed_subjects = parse_var("SEED_SUBJECTS", false)?;

        // --- Admin Password ---
        let admin_password_hash = match std::env::var("ADMIN_PASSWORD_HASH") {
            Ok(hash) => {
                argon2::PasswordHash::new(&hash).map_err(|e| {
                    ConfigError::InvalidValue("ADMIN_PASSWORD_HASH".to_string(), e.to_string())
                })?;
                hash
            }
            Err(_) => {
                let password =
                    std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
                hash_password(&password).map_err(|e| {
                    ConfigError::InvalidValue("ADMIN_PASSWORD".to_string(), e.to_string())
                })?
            }
        };

        // --- HTTP Settings ---
        let allowed_origin_str = std::env::var("ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let allowed_origin = HeaderValue::from_str(&allowed_origin_str).map_err(|e| {
            ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string())
        })?;

        let upstream_timeout = Duration::from_secs(parse_var("UPSTREAM_TIMEOUT_SECS", 30u64)?);

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            cdn_base,
            admin_password_hash,
            allowed_origin,
            upstream_timeout,
            seed_subjects,
        })
    }
}

/// Reads an optional variable, falling back to `default` when it is unset.
fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_optional_variables_use_the_default() {
        let value: u32 = parse_var("STUDY_CATALOG_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
