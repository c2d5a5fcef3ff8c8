// HTTP handlers for DraftDesk Backend

pub mod account;
pub mod auth;
pub mod billing;
pub mod content;
pub mod docs;
pub mod resume;

use crate::app::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

// Public authentication routes (no bearer token)
pub fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

// Session routes behind the auth middleware
pub fn session_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::get_current_user))
}

// Account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/entitlement", get(account::get_entitlement))
        .route("/profile", put(account::update_profile))
}

// Content request routes
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(content::submit_content).get(content::list_content))
        .route(
            "/{id}",
            get(content::get_content).put(content::edit_content),
        )
        .route("/{id}/cancel", post(content::cancel_content))
        .route("/{id}/resubmit", post(content::resubmit_content))
        .route("/{id}/regenerate", post(content::regenerate_content))
}

// Resume routes
pub fn resume_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(resume::register_resume).get(resume::list_resumes))
        .route("/{id}/enhance", post(resume::enhance_resume))
        .route("/{id}/cancel", post(resume::cancel_resume))
}

// Billing routes behind the auth middleware; the gateway callback is
// routed separately as a public endpoint
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(billing::subscribe_checkout))
        .route("/tokens", post(billing::token_checkout))
}
