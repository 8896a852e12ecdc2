//! HS256 session tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{AuthConfig, AuthError};

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "adminId")]
    pub admin_id: String,
    /// Unique token id, so two logins in the same second still differ.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token together with its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs a token for `admin_id` valid from `now` for the configured TTL.
///
/// # Errors
///
/// Returns [`AuthError::Signing`] if encoding fails.
pub fn issue_token(
    config: &AuthConfig,
    admin_id: &str,
    now: DateTime<Utc>,
) -> Result<IssuedToken, AuthError> {
    let claims = Claims {
        admin_id: admin_id.to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: (now + config.token_ttl).timestamp(),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(AuthError::Signing)?;

    Ok(IssuedToken { token, claims })
}

/// Verifies the signature and expiry of `token` and returns its claims.
///
/// # Errors
///
/// Returns [`AuthError::Expired`] for an expired token and
/// [`AuthError::Invalid`] for anything else that fails validation.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        kind => {
            log::debug!("Rejected token: {kind:?}");
            AuthError::Invalid
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig::new(secret, Duration::hours(24), 4)
    }

    #[test]
    fn issued_token_verifies() {
        let config = config("secret");
        let now = Utc::now();
        let issued = issue_token(&config, "admin-1", now).unwrap();

        assert_eq!(issued.claims.exp - issued.claims.iat, 24 * 60 * 60);

        let claims = verify_token(&config, &issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.admin_id, "admin-1");
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let config = config("secret");
        let now = Utc::now();
        let a = issue_token(&config, "admin-1", now).unwrap();
        let b = issue_token(&config, "admin-1", now).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn expired_token() {
        let config = config("secret");
        let issued = issue_token(&config, "admin-1", Utc::now() - Duration::days(2)).unwrap();
        assert!(matches!(
            verify_token(&config, &issued.token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn wrong_secret_or_garbage_is_invalid() {
        let issued = issue_token(&config("secret"), "admin-1", Utc::now()).unwrap();
        assert!(matches!(
            verify_token(&config("other"), &issued.token),
            Err(AuthError::Invalid)
        ));
        assert!(matches!(
            verify_token(&config("secret"), "not.a.jwt"),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn claims_use_admin_id_key() {
        let claims = Claims {
            admin_id: "a".to_string(),
            jti: "j".to_string(),
            iat: 1,
            exp: 2,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["adminId"], "a");
    }
}
