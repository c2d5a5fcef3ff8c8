// Authentication handlers for DraftDesk Backend
// Registration, login and session introspection against the Account Store

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
    models::user::NewUser,
    utils::{
        auth_errors::{log_auth_failure, AuthError},
        hash_password, trim_optional_field, verify_password,
    },
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 320, message = "Email must be less than 320 characters"))]
    pub email: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,

    pub password_confirmation: String,

    #[validate(length(max = 255, message = "Name must be less than 255 characters"))]
    pub name: Option<String>,
}

/// Custom password validation - min 8 chars, must have uppercase, lowercase, number, special char
fn validate_password(password: &str) -> Result<(), validator::ValidationError> {
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if password.len() < 8 {
        return Err(validator::ValidationError::new("password_too_short"));
    }

    if !has_uppercase || !has_lowercase || !has_digit || !has_special {
        return Err(validator::ValidationError::new("password_complexity"));
    }

    Ok(())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: String,
    pub email: String,
    pub tokens: i64,
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String,
    pub user: LoginUserInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUserInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub subscription_tier: String,
    pub tokens: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub subscription_tier: String,
    pub subscription_end: Option<String>,
    pub tokens: i64,
}

// =============================================================================
// AUTHENTICATION HANDLERS
// =============================================================================

/// POST /auth/register - Create a new account on the Free tier with the
/// starter token grant
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "Auth",
    operation_id = "register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return AuthError::ValidationError(e.to_string()).into_response();
    }

    if request.password != request.password_confirmation {
        return AuthError::ValidationError("Passwords do not match".to_string()).into_response();
    }

    let email = request.email.trim().to_lowercase();

    // Duplicate registration is the one credential error reported distinctly
    match state.accounts.find_user_by_email(&email).await {
        Ok(Some(_)) => return AuthError::EmailAlreadyRegistered.into_response(),
        Ok(None) => {},
        Err(e) => return AuthError::StoreError(e.to_string()).into_response(),
    }

    let password_hash = match hash_password(&request.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing failed: {}", e);
            return AuthError::InternalError.into_response();
        },
    };

    let name = trim_optional_field(request.name.as_ref());
    let user = match state
        .accounts
        .create_user(NewUser::at_signup(email, password_hash, name))
        .await
    {
        Ok(user) => user,
        Err(e) => return AuthError::StoreError(e.to_string()).into_response(),
    };

    tracing::info!(user = %user.id, "account created");
    let response = RegisterResponse {
        user_id: user.id,
        email: user.email,
        tokens: user.tokens,
        message: "Account created".to_string(),
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

/// POST /auth/login - Authenticate and issue a session token.
/// Unknown email and wrong password produce the same generic error.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    operation_id = "login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return AuthError::InvalidCredentials.into_response();
    }

    let user = match state.accounts.find_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            log_auth_failure(&email, &AuthError::InvalidCredentials);
            return AuthError::InvalidCredentials.into_response();
        },
        Err(e) => return AuthError::StoreError(e.to_string()).into_response(),
    };

    match verify_password(&request.password, &user.password_hash) {
        Ok(true) => {},
        Ok(false) => {
            log_auth_failure(&email, &AuthError::InvalidCredentials);
            return AuthError::InvalidCredentials.into_response();
        },
        Err(e) => {
            tracing::error!("password verification failed: {}", e);
            return AuthError::InternalError.into_response();
        },
    }

    // Login is a status read: expiry and monthly reset apply before the
    // tier is cached into the session token
    let (user, entitlement) = match state
        .entitlement_service
        .effective_entitlement(&user.id)
        .await
    {
        Ok(result) => result,
        Err(e) => return AuthError::StoreError(e.to_string()).into_response(),
    };

    let access_token = match state.jwt_service.generate_access_token(
        &user.id,
        &user.email,
        entitlement.tier.as_str(),
    ) {
        Ok(token) => token,
        Err(e) => return AuthError::TokenError(e.to_string()).into_response(),
    };

    tracing::info!(user = %user.id, "login successful");
    let response = LoginResponse {
        access_token,
        expires_in: state.jwt_service.access_token_expiry(),
        token_type: "Bearer".to_string(),
        user: LoginUserInfo {
            id: user.id,
            email: user.email,
            name: user.name,
            subscription_tier: entitlement.tier.as_str().to_string(),
            tokens: entitlement.tokens,
        },
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/logout - End the session. Tokens are stateless; the client
/// discards its copy and the short expiry bounds the remainder.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    operation_id = "logout",
    responses((status = 200, description = "Logged out")),
    security(("bearerAuth" = []))
)]
pub async fn logout(auth_user: AuthenticatedUser) -> impl IntoResponse {
    tracing::info!(user = %auth_user.user_id, "logout");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "message": "Logged out"
        })),
    )
}

/// GET /auth/me - Current user's profile and effective entitlement
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> impl IntoResponse {
    match state
        .entitlement_service
        .effective_entitlement(&auth_user.user_id)
        .await
    {
        Ok((user, entitlement)) => {
            let info = UserInfo {
                user_id: user.id,
                email: user.email,
                name: user.name,
                phone: user.phone,
                company_name: user.company_name,
                website: user.website,
                subscription_tier: entitlement.tier.as_str().to_string(),
                subscription_end: entitlement.subscription_end.map(|ts| ts.to_rfc3339()),
                tokens: entitlement.tokens,
            };
            (StatusCode::OK, Json(info)).into_response()
        },
        Err(e) => e.into_response(),
    }
}
