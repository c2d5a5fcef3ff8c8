// Library exports for DraftDesk Backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use middleware::auth_middleware;
pub use middleware::AuthenticatedUser;
pub use models::auth::AccessTokenClaims;
pub use models::content::{ContentParams, ContentType, RequestStatus};
pub use models::resume::ResumeKind;
pub use models::user::SubscriptionTier;
pub use services::{
    BillingService, CheckoutGateway, ContentService, Entitlement, EntitlementService, JwtConfig,
    JwtError, JwtService, ResumeService,
};
pub use store::{AccountStore, AirtableClient, ContentStore, ResumeStore, StoreError};

use std::sync::Arc;

// Library initialization function for external consumers
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error>> {
    use services::{
        BillingService, CheckoutGateway, ContentService, EntitlementService, FulfillmentDispatcher,
        JwtService, ResumeService,
    };
    use tracing::info;

    // Load environment
    dotenv::dotenv().ok();

    // Initialize config
    let config = app_config::config();

    // One record-store client serves all three tables
    info!("Initializing record store client...");
    let store_client = Arc::new(AirtableClient::new(config.store.clone()));
    let accounts: Arc<dyn AccountStore> = store_client.clone();
    let content_store: Arc<dyn ContentStore> = store_client.clone();
    let resume_store: Arc<dyn ResumeStore> = store_client;

    // Initialize services
    let jwt_service = Arc::new(JwtService::from_env()?);
    let entitlement_service = Arc::new(EntitlementService::new(accounts.clone()));
    let dispatcher = Arc::new(FulfillmentDispatcher::new(config.fulfillment.clone()));

    let content_service = Arc::new(ContentService::new(
        content_store,
        entitlement_service.clone(),
        dispatcher.clone(),
    ));
    let resume_service = Arc::new(ResumeService::new(
        resume_store,
        entitlement_service.clone(),
        dispatcher,
    ));

    let gateway = CheckoutGateway::new(config.checkout.clone());
    let billing_service = Arc::new(BillingService::new(
        gateway,
        entitlement_service.clone(),
        config.checkout.clone(),
        config.dashboard_url.clone(),
    ));

    Ok(AppState {
        config: Arc::new(config.clone()),
        accounts,
        jwt_service,
        entitlement_service,
        content_service,
        resume_service,
        billing_service,
    })
}

/// Assemble the full application router
pub fn build_router(state: AppState) -> axum::Router {
    use axum::routing::get;
    use tower_http::trace::TraceLayer;

    let public = axum::Router::new()
        .route("/health", get(health_check))
        .route("/openapi.json", get(handlers::docs::serve_openapi_spec))
        .route(
            "/billing/callback",
            get(handlers::billing::billing_callback),
        )
        .nest("/auth", handlers::public_auth_routes());

    let protected = axum::Router::new()
        .nest("/auth", handlers::session_auth_routes())
        .nest("/account", handlers::account_routes())
        .nest("/content", handlers::content_routes())
        .nest("/resumes", handlers::resume_routes())
        .nest("/billing", handlers::billing_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    axum::Router::new()
        .nest("/api/v1", public.merge(protected))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

// Health check handler
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let timestamp = chrono::Utc::now().to_rfc3339();

    // Probe the record store with a query that matches nothing; any
    // non-error response means the store is reachable
    let store_health = match state
        .accounts
        .find_user_by_email("health-probe@invalid.local")
        .await
    {
        Ok(_) => serde_json::json!({
            "status": "healthy",
            "error": null
        }),
        Err(e) => serde_json::json!({
            "status": "unhealthy",
            "error": format!("Record store unreachable: {}", e)
        }),
    };

    let overall_healthy = store_health["status"] == "healthy";

    let response = serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "draftdesk-backend",
        "timestamp": timestamp,
        "components": {
            "record_store": store_health
        }
    });

    if overall_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
