// Entitlement engine
// Computes effective subscription state and token balance from stored
// records: lazy expiry on read, calendar-month token resets, pre-checked
// debits and payment credits. All mutations go through the Account Store.

use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::models::user::{SubscriptionTier, User, UserPatch};
use crate::store::AccountStore;
use crate::utils::service_error::ServiceError;

/// Premium term granted per confirmed subscription payment
const PREMIUM_TERM_DAYS: i64 = 30;

/// A user's effective subscription state and balance, after expiry and
/// reset side effects have been applied
#[derive(Debug, Clone, Serialize)]
pub struct Entitlement {
    pub tier: SubscriptionTier,
    pub subscription_end: Option<DateTime<Utc>>,
    pub tokens: i64,
    pub last_reset: DateTime<Utc>,
}

impl Entitlement {
    fn of(user: &User) -> Self {
        Self {
            tier: user.tier,
            subscription_end: user.subscription_end,
            tokens: user.tokens,
            last_reset: user.last_reset,
        }
    }
}

/// True once a full calendar month has passed since the last reset
pub fn reset_due(last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match last_reset.checked_add_months(Months::new(1)) {
        Some(due) => now >= due,
        None => false,
    }
}

/// Net balance granted on upgrade: the Premium allotment minus whatever the
/// user already consumed of the Free allotment, never below zero
pub fn upgrade_token_grant(current_balance: i64) -> i64 {
    let premium = SubscriptionTier::Premium.monthly_token_allotment();
    let free = SubscriptionTier::Free.monthly_token_allotment();
    (premium - (free - current_balance)).max(0)
}

pub struct EntitlementService {
    accounts: Arc<dyn AccountStore>,
}

impl EntitlementService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Read a user's effective entitlement, applying the lazy side effects:
    /// an expired Premium is downgraded to Free, and a due calendar-month
    /// reset refills the balance to the effective tier's allotment. Both are
    /// folded into a single store write when anything changed.
    pub async fn effective_entitlement(
        &self,
        user_id: &str,
    ) -> Result<(User, Entitlement), ServiceError> {
        let user = self.accounts.get_user(user_id).await?;
        let now = Utc::now();

        let mut patch = UserPatch::default();
        let mut effective_tier = user.tier;

        if user.is_subscription_expired(now) {
            info!(user = %user.id, "subscription expired, downgrading to Free");
            effective_tier = SubscriptionTier::Free;
            patch.tier = Some(SubscriptionTier::Free);
            patch.subscription_end = Some(None);
        }

        if reset_due(user.last_reset, now) {
            let allotment = effective_tier.monthly_token_allotment();
            info!(user = %user.id, tokens = allotment, "monthly token reset");
            patch.tokens = Some(allotment);
            patch.last_reset = Some(now);
        }

        let user = if patch_is_empty(&patch) {
            user
        } else {
            self.accounts.update_user(&user.id, patch).await?
        };

        let entitlement = Entitlement::of(&user);
        Ok((user, entitlement))
    }

    /// Debit `cost` tokens from an account. The precondition is checked
    /// against the passed-in user, which callers obtain from
    /// `effective_entitlement` immediately beforehand.
    pub async fn debit_tokens(&self, user: &User, cost: i64) -> Result<User, ServiceError> {
        if user.tokens < cost {
            return Err(ServiceError::InsufficientTokens {
                required: cost,
                available: user.tokens,
            });
        }

        let patch = UserPatch {
            tokens: Some((user.tokens - cost).max(0)),
            ..Default::default()
        };
        let updated = self.accounts.update_user(&user.id, patch).await?;
        info!(user = %user.id, cost, balance = updated.tokens, "tokens debited");
        Ok(updated)
    }

    /// Apply a confirmed subscription payment: Premium for 30 days from now
    /// (renewal extends from now, not from the prior expiry) and the net
    /// token grant. The checkout session id is the idempotency key; a
    /// session already credited is acknowledged without changes.
    pub async fn credit_subscription(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<User, ServiceError> {
        let user = self.accounts.get_user(user_id).await?;

        if user.last_payment_session.as_deref() == Some(session_id) {
            info!(user = %user.id, session = session_id, "duplicate payment callback ignored");
            return Ok(user);
        }

        let now = Utc::now();
        let patch = UserPatch {
            tier: Some(SubscriptionTier::Premium),
            subscription_end: Some(Some(now + Duration::days(PREMIUM_TERM_DAYS))),
            tokens: Some(upgrade_token_grant(user.tokens)),
            last_reset: Some(now),
            last_payment_session: Some(session_id.to_string()),
            ..Default::default()
        };
        let updated = self.accounts.update_user(&user.id, patch).await?;
        info!(user = %user.id, "subscription upgraded to Premium");
        Ok(updated)
    }

    /// Apply a confirmed token-bundle payment, keyed by session id like
    /// subscription credits
    pub async fn credit_token_bundle(
        &self,
        user_id: &str,
        amount: i64,
        session_id: &str,
    ) -> Result<User, ServiceError> {
        let user = self.accounts.get_user(user_id).await?;

        if user.last_payment_session.as_deref() == Some(session_id) {
            info!(user = %user.id, session = session_id, "duplicate payment callback ignored");
            return Ok(user);
        }

        let patch = UserPatch {
            tokens: Some((user.tokens + amount).max(0)),
            last_payment_session: Some(session_id.to_string()),
            ..Default::default()
        };
        let updated = self.accounts.update_user(&user.id, patch).await?;
        info!(user = %user.id, amount, balance = updated.tokens, "token bundle credited");
        Ok(updated)
    }
}

fn patch_is_empty(patch: &UserPatch) -> bool {
    patch.tier.is_none()
        && patch.subscription_end.is_none()
        && patch.tokens.is_none()
        && patch.last_reset.is_none()
        && patch.name.is_none()
        && patch.phone.is_none()
        && patch.company_name.is_none()
        && patch.website.is_none()
        && patch.last_payment_session.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reset_not_due_within_month() {
        let last = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();

        let just_before = Utc.with_ymd_and_hms(2025, 4, 15, 11, 59, 59).unwrap();
        assert!(!reset_due(last, just_before));

        let same_moment = last;
        assert!(!reset_due(last, same_moment));
    }

    #[test]
    fn test_reset_due_at_month_boundary() {
        let last = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();

        let exactly = Utc.with_ymd_and_hms(2025, 4, 15, 12, 0, 0).unwrap();
        assert!(reset_due(last, exactly));

        let well_past = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        assert!(reset_due(last, well_past));
    }

    #[test]
    fn test_reset_handles_short_months() {
        // Jan 31 + 1 month clamps to Feb 28 in a non-leap year
        let last = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();

        let feb_27 = Utc.with_ymd_and_hms(2025, 2, 27, 0, 0, 0).unwrap();
        assert!(!reset_due(last, feb_27));

        let feb_28 = Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap();
        assert!(reset_due(last, feb_28));
    }

    #[test]
    fn test_upgrade_grant_formula() {
        // Fully consumed Free allotment: 100 - (10 - 0) = 90
        assert_eq!(upgrade_token_grant(0), 90);
        // Untouched Free allotment: 100 - (10 - 10) = 100
        assert_eq!(upgrade_token_grant(10), 100);
        // Partially consumed
        assert_eq!(upgrade_token_grant(4), 94);
    }

    #[test]
    fn test_upgrade_grant_clamps_at_zero() {
        // Defensive only: debits are pre-checked, but a wildly negative
        // stored balance must not produce a negative grant
        assert_eq!(upgrade_token_grant(-200), 0);
    }
}
