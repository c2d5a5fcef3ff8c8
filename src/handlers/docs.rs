// OpenAPI documentation
// Aggregated from the handler annotations and served as plain JSON

use axum::{http::StatusCode, response::IntoResponse, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{account, auth, billing, content, resume};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::get_current_user,
        account::get_entitlement,
        account::update_profile,
        content::submit_content,
        content::list_content,
        content::get_content,
        content::edit_content,
        content::cancel_content,
        content::resubmit_content,
        content::regenerate_content,
        resume::register_resume,
        resume::list_resumes,
        resume::enhance_resume,
        resume::cancel_resume,
        billing::subscribe_checkout,
        billing::token_checkout,
        billing::billing_callback,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::RegisterResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::LoginUserInfo,
            auth::UserInfo,
            account::EntitlementResponse,
            account::UpdateProfileRequest,
            content::SubmitContentRequest,
            content::EditContentRequest,
            content::ResubmitContentRequest,
            content::ContentItemResponse,
            content::ContentListResponse,
            resume::RegisterResumeRequest,
            resume::EnhanceResumeRequest,
            resume::ResumeItemResponse,
            resume::ResumeListResponse,
            billing::CheckoutResponse,
            billing::CallbackResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and session endpoints"),
        (name = "Account", description = "Entitlement and profile endpoints"),
        (name = "Content", description = "Content generation requests"),
        (name = "Resumes", description = "Resume uploads and enhancements"),
        (name = "Billing", description = "Checkout and payment reconciliation")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI JSON specification
pub async fn serve_openapi_spec() -> impl IntoResponse {
    (StatusCode::OK, Json(ApiDoc::openapi()))
}
