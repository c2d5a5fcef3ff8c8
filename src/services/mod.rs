// Services module for DraftDesk Backend
// Business logic layer for the application

pub mod billing;
pub mod content;
pub mod dispatch;
pub mod entitlement;
pub mod jwt;
pub mod resume;

// Re-export commonly used services
pub use billing::{BillingService, CheckoutGateway, CheckoutSession};
pub use content::ContentService;
pub use dispatch::{DispatchError, Dispatcher, FulfillmentDispatcher};
pub use entitlement::{Entitlement, EntitlementService};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use resume::ResumeService;
