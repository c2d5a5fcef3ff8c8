// Centralized configuration management for DraftDesk Backend
// Load ALL env vars ONCE at startup

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    // For tests, load .env file first
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Accessor kept for call sites that prefer a function over the static
pub fn config() -> &'static AppConfig {
    &CONFIG
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,

    // Application URLs
    pub dashboard_url: String, // Frontend dashboard URL, used for checkout return links

    // Nested configs
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    pub checkout: CheckoutConfig,
    pub fulfillment: FulfillmentConfig,
    pub cors_allowed_origins: Vec<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Hosted record store (Airtable-style REST API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub api_url: String,
    pub api_token: String,
    pub base_id: String,
    pub users_table: String,
    pub content_table: String,
    pub resumes_table: String,
    pub request_timeout_secs: u64,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_expiry: u64,
    pub audience: String,
    pub issuer: String,
}

/// Hosted checkout (payment gateway) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    pub api_url: String,
    pub secret_key: String,
    pub currency: String,
    /// Premium subscription price, in cents per month
    pub premium_price_cents: u32,
    /// Token bundle price, in cents
    pub token_bundle_price_cents: u32,
    /// Tokens credited per bundle purchase
    pub token_bundle_size: i64,
    pub request_timeout_secs: u64,
}

/// Fulfillment webhook (external worker) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentConfig {
    pub webhook_url: String,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get required env var
        let get_required = |key: &str| -> Result<String, ConfigError> {
            env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
        };

        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_u32_or_default = |key: &str, default: &str| -> Result<u32, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u32".to_string())
            })
        };

        // Parse bind address to extract port
        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let dashboard_url = get_or_default("DASHBOARD_URL", "http://localhost:3000");

        // JWT secret validation
        let jwt_access_secret = get_required("JWT_ACCESS_SECRET")?;
        if jwt_access_secret.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "JWT_ACCESS_SECRET".to_string(),
                "Secret must be at least 32 characters long".to_string(),
            ));
        }

        let environment_str = get_or_default("ENVIRONMENT", "development");
        let environment = Environment::from(environment_str);

        // Record store
        let store_api_url = get_or_default("STORE_API_URL", "https://api.airtable.com/v0");
        let store_api_token = get_required("STORE_API_TOKEN")?;
        let store_base_id = get_required("STORE_BASE_ID")?;
        let store_users_table = get_or_default("STORE_USERS_TABLE", "Users");
        let store_content_table = get_or_default("STORE_CONTENT_TABLE", "Content");
        let store_resumes_table = get_or_default("STORE_RESUMES_TABLE", "Resumes");
        let store_request_timeout = parse_u64_or_default("STORE_REQUEST_TIMEOUT_SECS", "15")?;

        // JWT
        let jwt_access_expiry = parse_u64_or_default("JWT_ACCESS_EXPIRY", "3600")?;
        let jwt_audience = get_or_default("JWT_AUDIENCE", "draftdesk.app");
        let jwt_issuer = get_or_default("JWT_ISSUER", "draftdesk.app");

        // Checkout gateway
        let checkout_api_url = get_or_default("CHECKOUT_API_URL", "https://api.stripe.com/v1");
        let checkout_secret_key = get_required("CHECKOUT_SECRET_KEY")?;
        let checkout_currency = get_or_default("CHECKOUT_CURRENCY", "usd");
        let premium_price_cents = parse_u32_or_default("PREMIUM_PRICE_CENTS", "1000")?;
        let token_bundle_price_cents = parse_u32_or_default("TOKEN_BUNDLE_PRICE_CENTS", "500")?;
        let token_bundle_size: i64 =
            get_or_default("TOKEN_BUNDLE_SIZE", "50").parse().map_err(|_| {
                ConfigError::InvalidValue(
                    "TOKEN_BUNDLE_SIZE".to_string(),
                    "not a valid i64".to_string(),
                )
            })?;
        let checkout_request_timeout = parse_u64_or_default("CHECKOUT_REQUEST_TIMEOUT_SECS", "30")?;

        // Fulfillment webhook
        let fulfillment_webhook_url = get_required("FULFILLMENT_WEBHOOK_URL")?;
        let fulfillment_request_timeout =
            parse_u64_or_default("FULFILLMENT_REQUEST_TIMEOUT_SECS", "30")?;

        let cors_allowed_origins: Vec<String> = get_or_default("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let rust_log = get_or_default("RUST_LOG", "info");

        let server = ServerConfig {
            bind_address: bind_address.clone(),
            port,
            environment: environment.clone(),
            rust_log: rust_log.clone(),
        };

        let store = StoreConfig {
            api_url: store_api_url,
            api_token: store_api_token,
            base_id: store_base_id,
            users_table: store_users_table,
            content_table: store_content_table,
            resumes_table: store_resumes_table,
            request_timeout_secs: store_request_timeout,
        };

        let jwt = JwtConfig {
            access_secret: jwt_access_secret,
            access_expiry: jwt_access_expiry,
            audience: jwt_audience,
            issuer: jwt_issuer,
        };

        let checkout = CheckoutConfig {
            api_url: checkout_api_url,
            secret_key: checkout_secret_key,
            currency: checkout_currency,
            premium_price_cents,
            token_bundle_price_cents,
            token_bundle_size,
            request_timeout_secs: checkout_request_timeout,
        };

        let fulfillment = FulfillmentConfig {
            webhook_url: fulfillment_webhook_url,
            request_timeout_secs: fulfillment_request_timeout,
        };

        Ok(AppConfig {
            bind_address,
            port,
            environment,
            rust_log,
            dashboard_url,
            server,
            store,
            jwt,
            checkout,
            fulfillment,
            cors_allowed_origins,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
