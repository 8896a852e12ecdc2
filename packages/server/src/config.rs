//! Server configuration read from environment variables.

use std::path::PathBuf;

use rth_map_auth::{AuthConfig, AuthError, config::DEFAULT_BCRYPT_COST, config::DEFAULT_TOKEN_TTL};
use thiserror::Error;

/// Signing key used outside production when `JWT_SECRET` is unset.
const DEVELOPMENT_JWT_SECRET: &str = "rth-map-development-secret";

/// Errors that can occur while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {name}: '{value}'")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// `JWT_SECRET` must be set when running in production.
    #[error("JWT_SECRET must be set when APP_ENV=production")]
    MissingSecret,

    /// An authentication setting is malformed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub db_pool_size: usize,
    /// `true` when `APP_ENV=production`; hides internal error details.
    pub production: bool,
    /// Directory of the built frontend, served at `/` when it exists.
    pub static_dir: PathBuf,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is malformed or a production
    /// deployment has no `JWT_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as
    /// unset.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let production = get("APP_ENV").is_some_and(|v| v.trim().eq_ignore_ascii_case("production"));

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if production => return Err(ConfigError::MissingSecret),
            None => {
                log::warn!("JWT_SECRET is not set; using the development signing key");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
        };

        let token_ttl = rth_map_auth::parse_duration(
            &get("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_TOKEN_TTL.to_string()),
        )?;

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("PORT", get("PORT"), 5000)?,
            database_path: get("DATABASE_PATH")
                .map_or_else(rth_map_database::paths::default_database_path, PathBuf::from),
            db_pool_size: parse_or("DB_POOL_SIZE", get("DB_POOL_SIZE"), 4)?,
            production,
            static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "app/dist".to_string())),
            auth: AuthConfig::new(
                jwt_secret,
                token_ttl,
                parse_or("BCRYPT_COST", get("BCRYPT_COST"), DEFAULT_BCRYPT_COST)?,
            ),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    value.map_or(Ok(default), |v| {
        v.trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: v })
    })
}
