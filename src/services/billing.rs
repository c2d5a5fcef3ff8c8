// Billing service
// Creates hosted checkout sessions at the payment gateway and reconciles
// the return callback into entitlement credits. The gateway session id is
// the idempotency key for callbacks.

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::app_config::CheckoutConfig;
use crate::models::user::User;
use crate::services::entitlement::EntitlementService;
use crate::utils::service_error::ServiceError;

// =============================================================================
// CHECKOUT GATEWAY CLIENT
// =============================================================================

/// A created checkout session: the id we reconcile on and the hosted page
/// the user is redirected to
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

pub struct CheckoutGateway {
    http_client: reqwest::Client,
    config: CheckoutConfig,
}

impl CheckoutGateway {
    pub fn new(config: CheckoutConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            config,
        }
    }

    /// Create a hosted checkout session. Gateway errors are surfaced
    /// verbatim to the caller.
    pub async fn create_session(
        &self,
        amount_cents: u32,
        description: &str,
        recurring: bool,
        client_ref: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, ServiceError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), if recurring { "subscription" } else { "payment" }.to_string()),
            ("client_reference_id".to_string(), client_ref.to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                self.config.currency.clone(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                description.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                amount_cents.to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];
        if recurring {
            form.push((
                "line_items[0][price_data][recurring][interval]".to_string(),
                "month".to_string(),
            ));
        }

        let response = self
            .http_client
            .post(format!("{}/checkout/sessions", self.config.api_url))
            .basic_auth(&self.config.secret_key, Option::<&str>::None)
            .form(&form)
            .send()
            .await
            .map_err(|e| ServiceError::Payment(e.to_string()))?;

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Payment(message));
        }

        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| ServiceError::Payment(e.to_string()))
    }
}

// =============================================================================
// BILLING SERVICE
// =============================================================================

pub struct BillingService {
    gateway: CheckoutGateway,
    entitlements: Arc<EntitlementService>,
    config: CheckoutConfig,
    dashboard_url: String,
}

impl BillingService {
    pub fn new(
        gateway: CheckoutGateway,
        entitlements: Arc<EntitlementService>,
        config: CheckoutConfig,
        dashboard_url: String,
    ) -> Self {
        Self {
            gateway,
            entitlements,
            config,
            dashboard_url,
        }
    }

    /// Start a Premium subscription checkout; returns the hosted redirect URL
    pub async fn subscription_checkout(&self, user: &User) -> Result<String, ServiceError> {
        let success_url = format!(
            "{}/?success=true&session_id={{CHECKOUT_SESSION_ID}}&client_ref={}",
            self.dashboard_url, user.id
        );
        let cancel_url = format!("{}/?cancel=true", self.dashboard_url);

        let session = self
            .gateway
            .create_session(
                self.config.premium_price_cents,
                "Premium Plan",
                true,
                &user.id,
                &success_url,
                &cancel_url,
            )
            .await?;

        info!(user = %user.id, session = %session.id, "subscription checkout created");
        Ok(session.url)
    }

    /// Start a token-bundle checkout; returns the hosted redirect URL
    pub async fn token_checkout(&self, user: &User) -> Result<String, ServiceError> {
        let success_url = format!(
            "{}/?token_success=true&session_id={{CHECKOUT_SESSION_ID}}&client_ref={}",
            self.dashboard_url, user.id
        );
        let cancel_url = format!("{}/?cancel=true", self.dashboard_url);

        let description = format!("{} Token Bundle", self.config.token_bundle_size);
        let session = self
            .gateway
            .create_session(
                self.config.token_bundle_price_cents,
                &description,
                false,
                &user.id,
                &success_url,
                &cancel_url,
            )
            .await?;

        info!(user = %user.id, session = %session.id, "token checkout created");
        Ok(session.url)
    }

    /// Reconcile a confirmed subscription callback (at most once per session)
    pub async fn confirm_subscription(
        &self,
        client_ref: &str,
        session_id: &str,
    ) -> Result<User, ServiceError> {
        self.entitlements
            .credit_subscription(client_ref, session_id)
            .await
    }

    /// Reconcile a confirmed token-bundle callback (at most once per session)
    pub async fn confirm_token_purchase(
        &self,
        client_ref: &str,
        session_id: &str,
    ) -> Result<User, ServiceError> {
        self.entitlements
            .credit_token_bundle(client_ref, self.config.token_bundle_size, session_id)
            .await
    }

    /// Tokens per purchased bundle, for response messages
    pub fn token_bundle_size(&self) -> i64 {
        self.config.token_bundle_size
    }
}
