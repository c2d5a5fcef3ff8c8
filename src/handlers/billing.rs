// Billing handlers
// Checkout session creation and the gateway return callback

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    app::AppState, middleware::auth::AuthenticatedUser, utils::service_error::ServiceError,
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Hosted checkout page the client should redirect to
    pub redirect_url: String,
}

/// Gateway return callback. Two independent flows are distinguished by
/// which marker parameter is present; `client_ref` carries the user record
/// id embedded in the original session.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub success: Option<String>,
    pub token_success: Option<String>,
    pub cancel: Option<String>,
    pub session_id: Option<String>,
    pub client_ref: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CallbackResponse {
    pub success: bool,
    pub message: String,
    pub tier: Option<String>,
    pub tokens: Option<i64>,
}

// =============================================================================
// BILLING HANDLERS
// =============================================================================

/// POST /billing/subscribe - Create a Premium subscription checkout session
#[utoipa::path(
    post,
    path = "/v1/billing/subscribe",
    tag = "Billing",
    operation_id = "subscribeCheckout",
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 502, description = "Payment gateway error")
    ),
    security(("bearerAuth" = []))
)]
pub async fn subscribe_checkout(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> impl IntoResponse {
    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.billing_service.subscription_checkout(&user).await {
        Ok(redirect_url) => {
            (StatusCode::OK, Json(CheckoutResponse { redirect_url })).into_response()
        },
        Err(e) => e.into_response(),
    }
}

/// POST /billing/tokens - Create a token-bundle checkout session
#[utoipa::path(
    post,
    path = "/v1/billing/tokens",
    tag = "Billing",
    operation_id = "tokenCheckout",
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 502, description = "Payment gateway error")
    ),
    security(("bearerAuth" = []))
)]
pub async fn token_checkout(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> impl IntoResponse {
    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.billing_service.token_checkout(&user).await {
        Ok(redirect_url) => {
            (StatusCode::OK, Json(CheckoutResponse { redirect_url })).into_response()
        },
        Err(e) => e.into_response(),
    }
}

/// GET /billing/callback - Gateway return callback. Unauthenticated: the
/// user is identified by the client reference embedded in the session, and
/// the session id makes each credit at-most-once.
#[utoipa::path(
    get,
    path = "/v1/billing/callback",
    tag = "Billing",
    operation_id = "billingCallback",
    params(
        ("success" = Option<String>, Query, description = "Subscription flow marker"),
        ("token_success" = Option<String>, Query, description = "Token purchase flow marker"),
        ("cancel" = Option<String>, Query, description = "Cancelled checkout marker"),
        ("session_id" = Option<String>, Query, description = "Gateway checkout session id"),
        ("client_ref" = Option<String>, Query, description = "User record id from the session")
    ),
    responses(
        (status = 200, description = "Callback processed", body = CallbackResponse),
        (status = 400, description = "Malformed callback")
    )
)]
pub async fn billing_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    if query.cancel.as_deref() == Some("true") {
        return (
            StatusCode::OK,
            Json(CallbackResponse {
                success: false,
                message: "Payment cancelled".to_string(),
                tier: None,
                tokens: None,
            }),
        )
            .into_response();
    }

    let subscription_flow = query.success.as_deref() == Some("true");
    let token_flow = query.token_success.as_deref() == Some("true");
    if !subscription_flow && !token_flow {
        return ServiceError::Validation("missing callback marker".to_string()).into_response();
    }

    let (client_ref, session_id) = match (query.client_ref, query.session_id) {
        (Some(client_ref), Some(session_id)) => (client_ref, session_id),
        _ => {
            return ServiceError::Validation(
                "callback is missing client_ref or session_id".to_string(),
            )
            .into_response();
        },
    };

    let result = if subscription_flow {
        state
            .billing_service
            .confirm_subscription(&client_ref, &session_id)
            .await
            .map(|user| CallbackResponse {
                success: true,
                message: "Subscription upgraded to Premium".to_string(),
                tier: Some(user.tier.as_str().to_string()),
                tokens: Some(user.tokens),
            })
    } else {
        state
            .billing_service
            .confirm_token_purchase(&client_ref, &session_id)
            .await
            .map(|user| CallbackResponse {
                success: true,
                message: format!(
                    "{} tokens added to your balance",
                    state.billing_service.token_bundle_size()
                ),
                tier: Some(user.tier.as_str().to_string()),
                tokens: Some(user.tokens),
            })
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}
