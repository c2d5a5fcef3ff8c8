// JWT session token service
// HS256 access tokens carrying the session's user id and cached tier

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::AccessTokenClaims;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Clock error: {0}")]
    ClockError(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidToken => JwtError::InvalidToken,
            _ => JwtError::EncodingError(err.to_string()),
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_expiry: u64, // seconds
    pub algorithm: Algorithm,     // HS256 (HMAC SHA-256)

    pub audience: String,
    pub issuer: String,

    pub access_encoding_key: EncodingKey,
    pub access_decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("algorithm", &self.algorithm)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("access_encoding_key", &"<redacted>")
            .field("access_decoding_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    fn build_from_params(
        access_secret: &str,
        access_expiry: u64,
        audience: String,
        issuer: String,
    ) -> Self {
        JwtConfig {
            access_token_expiry: access_expiry,
            algorithm: Algorithm::HS256,
            audience,
            issuer,
            access_encoding_key: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(access_secret.as_bytes()),
        }
    }

    /// Create JWT config from centralized app configuration
    pub fn from_env() -> Result<Self, JwtError> {
        let crate::app_config::JwtConfig {
            access_secret,
            access_expiry,
            audience,
            issuer,
        } = &crate::CONFIG.jwt;

        Ok(Self::build_from_params(
            access_secret,
            *access_expiry,
            audience.clone(),
            issuer.clone(),
        ))
    }

    /// Create JWT config for tests without touching the lazy static
    #[cfg(test)]
    pub fn for_test() -> Self {
        Self::build_from_params(
            "test-access-secret-hs256",
            3600,
            "test.draftdesk.app".to_string(),
            "test.draftdesk.app".to_string(),
        )
    }
}

// =============================================================================
// JWT SERVICE
// =============================================================================

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self, JwtError> {
        Ok(Self::new(JwtConfig::from_env()?))
    }

    /// Generate an access token for a logged-in user
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
        subscription_tier: &str,
    ) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::ClockError(e.to_string()))?
            .as_secs();

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: email.to_string(),
            tier: subscription_tier.to_string(),
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
            iat: now,
            exp: now + self.config.access_token_expiry,
        };

        let header = Header::new(self.config.algorithm);
        encode(&header, &claims, &self.config.access_encoding_key).map_err(Into::into)
    }

    /// Validates an access token and returns the decoded claims
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0; // No leeway for expiry validation

        let token_data =
            decode::<AccessTokenClaims>(token, &self.config.access_decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Access token lifetime in seconds, for login responses
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig::for_test())
    }

    #[test]
    fn test_token_round_trip() {
        let service = service();
        let token = service
            .generate_access_token("recUSER1", "user@example.com", "Free")
            .expect("token generation");

        let claims = service.validate_access_token(&token).expect("validation");
        assert_eq!(claims.sub, "recUSER1");
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.tier, "Free");
        assert_eq!(claims.aud, "test.draftdesk.app");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = service();
        let token = service
            .generate_access_token("recUSER1", "user@example.com", "Free")
            .expect("token generation");

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.validate_access_token(&tampered).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = service();
        assert!(service.validate_access_token("not.a.jwt").is_err());
    }
}
