// Account handlers: entitlement reads and profile updates

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::user::UserPatch,
    utils::{service_error::ServiceError, trim_optional_field},
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct EntitlementResponse {
    pub tier: String,
    pub subscription_end: Option<String>,
    pub tokens: i64,
    pub last_reset: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 255, message = "Name must be less than 255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 32, message = "Phone must be less than 32 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "Company name must be less than 255 characters"))]
    pub company_name: Option<String>,

    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
}

// =============================================================================
// ACCOUNT HANDLERS
// =============================================================================

/// GET /account/entitlement - Effective subscription state and balance.
/// This read applies lazy expiry and the monthly reset as side effects.
#[utoipa::path(
    get,
    path = "/v1/account/entitlement",
    tag = "Account",
    operation_id = "getEntitlement",
    responses(
        (status = 200, description = "Effective entitlement", body = EntitlementResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_entitlement(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> impl IntoResponse {
    match state
        .entitlement_service
        .effective_entitlement(&auth_user.user_id)
        .await
    {
        Ok((_, entitlement)) => {
            let response = EntitlementResponse {
                tier: entitlement.tier.as_str().to_string(),
                subscription_end: entitlement.subscription_end.map(|ts| ts.to_rfc3339()),
                tokens: entitlement.tokens,
                last_reset: entitlement.last_reset.to_rfc3339(),
            };
            (StatusCode::OK, Json(response)).into_response()
        },
        Err(e) => e.into_response(),
    }
}

/// PUT /account/profile - Update profile fields
#[utoipa::path(
    put,
    path = "/v1/account/profile",
    tag = "Account",
    operation_id = "updateProfile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let patch = UserPatch {
        name: trim_optional_field(request.name.as_ref()),
        phone: trim_optional_field(request.phone.as_ref()),
        company_name: trim_optional_field(request.company_name.as_ref()),
        website: trim_optional_field(request.website.as_ref()),
        ..Default::default()
    };

    match state.accounts.update_user(&auth_user.user_id, patch).await {
        Ok(user) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "name": user.name,
                "phone": user.phone,
                "company_name": user.company_name,
                "website": user.website,
            })),
        )
            .into_response(),
        Err(e) => ServiceError::from(e).into_response(),
    }
}
