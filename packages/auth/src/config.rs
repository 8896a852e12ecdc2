//! Authentication settings.

use chrono::Duration;

use crate::AuthError;

/// Default token lifetime, matching `JWT_EXPIRES_IN=24h`.
pub const DEFAULT_TOKEN_TTL: &str = "24h";

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Secrets and parameters used to issue tokens and hash passwords.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for HS256 signatures.
    pub jwt_secret: String,
    /// How long an issued token stays valid.
    pub token_ttl: Duration,
    /// bcrypt work factor for new hashes.
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: impl Into<String>, token_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl,
            bcrypt_cost,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Parses a lifetime such as `30s`, `15m`, `24h` or `7d`.
///
/// A bare number is read as seconds.
///
/// # Errors
///
/// Returns [`AuthError::Duration`] if the value is empty, not a positive
/// integer, or carries an unknown unit.
pub fn parse_duration(value: &str) -> Result<Duration, AuthError> {
    let invalid = || AuthError::Duration {
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let seconds_per_unit = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(seconds_per_unit)
        .and_then(Duration::try_seconds)
        .ok_or_else(invalid)
}
