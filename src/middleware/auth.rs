// Authenticated-user session object injected by the auth middleware

use serde::{Deserialize, Serialize};

/// Session information extracted from a validated JWT.
/// `subscription_tier` is the tier cached at token issue time; operations
/// that depend on entitlement re-read the Account Store instead of
/// trusting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub token_id: String,
    pub email: String,
    pub subscription_tier: String,
    pub exp: u64,
}
