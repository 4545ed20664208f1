//! JWT session tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::AccountRole;
use crate::shared::InfraError;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token lifetime in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
            issuer: "studio-booking".to_string(),
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expiration_hours * 3600
    }
}

/// JWT claims of a signed-in account
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (account id)
    pub sub: String,
    pub username: String,
    pub role: AccountRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user_id: &str, username: &str, role: AccountRole, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }
}

/// Create a signed token for an account
pub fn create_token(
    user_id: &str,
    username: &str,
    role: AccountRole,
    config: &JwtConfig,
) -> Result<String, InfraError> {
    let claims = TokenClaims::new(user_id, username, role, config);

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?)
}

/// Verify signature, issuer and expiry, then decode the claims
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<TokenClaims, InfraError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_keeps_role() {
        let config = JwtConfig::new("test-secret", 1);
        let token = create_token("u-1", "pm", AccountRole::PakhshManager, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.role, AccountRole::PakhshManager);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_token("u-1", "pm", AccountRole::Admin, &JwtConfig::new("a", 1)).unwrap();
        assert!(verify_token(&token, &JwtConfig::new("b", 1)).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig::new("test-secret", -2);
        let token = create_token("u-1", "pm", AccountRole::Admin, &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
