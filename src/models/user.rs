// User account model backed by the hosted record store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Subscription tier gating feature access and the monthly token allotment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionTier {
    Free,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "Free",
            SubscriptionTier::Premium => "Premium",
        }
    }

    /// Tokens granted by the monthly reset for this tier
    pub fn monthly_token_allotment(&self) -> i64 {
        match self {
            SubscriptionTier::Free => 10,
            SubscriptionTier::Premium => 100,
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Free" => Ok(SubscriptionTier::Free),
            "Premium" => Ok(SubscriptionTier::Premium),
            _ => Err(format!("Invalid subscription tier: {}", s)),
        }
    }
}

/// Tokens granted once at signup
pub const STARTER_TOKEN_GRANT: i64 = 10;

/// User account as stored in the Account Store.
/// `id` is the store's opaque record id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub tier: SubscriptionTier,
    pub subscription_end: Option<DateTime<Utc>>,
    pub tokens: i64,
    pub last_reset: DateTime<Utc>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub website: Option<String>,
    /// Idempotency key: the last checkout session credited to this account
    pub last_payment_session: Option<String>,
}

/// New user for creation at signup
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub tier: SubscriptionTier,
    pub tokens: i64,
    pub last_reset: DateTime<Utc>,
    pub name: Option<String>,
}

impl NewUser {
    /// Signup defaults: Free tier with the starter token grant
    pub fn at_signup(email: String, password_hash: String, name: Option<String>) -> Self {
        Self {
            email,
            password_hash,
            tier: SubscriptionTier::Free,
            tokens: STARTER_TOKEN_GRANT,
            last_reset: Utc::now(),
            name,
        }
    }
}

/// Partial update against a user record. `None` fields are left untouched;
/// the inner `Option` on nullable fields distinguishes "clear" from "skip".
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub tier: Option<SubscriptionTier>,
    pub subscription_end: Option<Option<DateTime<Utc>>>,
    pub tokens: Option<i64>,
    pub last_reset: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub last_payment_session: Option<String>,
}

impl User {
    /// Premium whose `subscription_end` has passed reads as expired
    pub fn is_subscription_expired(&self, now: DateTime<Utc>) -> bool {
        match (self.tier, self.subscription_end) {
            (SubscriptionTier::Premium, Some(end)) => now >= end,
            // Premium with no recorded end treated as expired rather than perpetual
            (SubscriptionTier::Premium, None) => true,
            (SubscriptionTier::Free, _) => false,
        }
    }
}
