#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Credentials for dashboard administrators.
//!
//! Passwords are stored as bcrypt hashes. Sessions are stateless HS256
//! JWTs; revocation is handled by the caller through the token blacklist
//! table, keyed by the raw token and expiring with it.

pub mod config;
pub mod password;
pub mod token;

pub use config::{AuthConfig, parse_duration};
pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, issue_token, verify_token};

use thiserror::Error;

/// Errors that can occur while hashing passwords or handling tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token's `exp` claim is in the past.
    #[error("Token expired.")]
    Expired,

    /// The token is malformed, has a bad signature, or lacks claims.
    #[error("Invalid token.")]
    Invalid,

    /// Signing a new token failed.
    #[error("Token signing error: {0}")]
    Signing(jsonwebtoken::errors::Error),

    /// Hashing or verifying a password failed.
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// A duration setting such as `JWT_EXPIRES_IN` could not be parsed.
    #[error("Invalid duration '{value}': expected <number><s|m|h|d>")]
    Duration {
        /// The rejected input.
        value: String,
    },
}
