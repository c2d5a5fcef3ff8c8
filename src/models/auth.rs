// JWT claims structures

use serde::{Deserialize, Serialize};

/// Access token claims carried by the session bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User record id (subject)
    pub sub: String,

    /// JWT ID (UUID format)
    pub jti: String,

    /// User email address
    pub email: String,

    /// Subscription tier at issue time; entitlement-changing writes
    /// invalidate it by forcing a fresh store read
    pub tier: String,

    /// Audience (aud)
    pub aud: String,

    /// Issuer (iss)
    pub iss: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}
