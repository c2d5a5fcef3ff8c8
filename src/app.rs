// Application state and configuration
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    services::{BillingService, ContentService, EntitlementService, JwtService, ResumeService},
    store::AccountStore,
};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountStore>,
    pub jwt_service: Arc<JwtService>,
    pub entitlement_service: Arc<EntitlementService>,
    pub content_service: Arc<ContentService>,
    pub resume_service: Arc<ResumeService>,
    pub billing_service: Arc<BillingService>,
}
