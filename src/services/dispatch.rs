// Fulfillment dispatcher
// Hands a debited request off to the external worker with a single webhook
// POST. Success is HTTP 200; there is no retry — a failure is surfaced to
// the caller and the Requested record is left in place.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::app_config::FulfillmentConfig;
use crate::models::content::{ContentParams, ContentRequest};
use crate::models::resume::ResumeRecord;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Fulfillment worker rejected dispatch (HTTP {0})")]
    Rejected(u16),
}

// =============================================================================
// DISPATCHER
// =============================================================================

/// Hand-off seam to the external worker
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch_content(
        &self,
        request: &ContentRequest,
        token_cost: i64,
    ) -> Result<(), DispatchError>;

    async fn dispatch_resume(
        &self,
        record: &ResumeRecord,
        token_cost: i64,
    ) -> Result<(), DispatchError>;
}

pub struct FulfillmentDispatcher {
    http_client: reqwest::Client,
    config: FulfillmentConfig,
}

impl FulfillmentDispatcher {
    pub fn new(config: FulfillmentConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            config,
        }
    }

    async fn post(&self, payload: serde_json::Value) -> Result<(), DispatchError> {
        let response = self
            .http_client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await?;

        // Success is HTTP 200 exactly; anything else leaves the record
        // Requested and is reported to the user
        if response.status() != reqwest::StatusCode::OK {
            warn!(status = response.status().as_u16(), "fulfillment dispatch rejected");
            return Err(DispatchError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for FulfillmentDispatcher {
    /// Dispatch a content generation request
    async fn dispatch_content(
        &self,
        request: &ContentRequest,
        token_cost: i64,
    ) -> Result<(), DispatchError> {
        let mut payload = json!({
            "userId": request.user_id,
            "userEmail": request.user_email,
            "recordId": request.id,
            "contentType": request.content_type.as_str(),
            "details": request.details,
            "tokenCost": token_cost,
        });

        // Type-specific fields ride alongside the common ones
        match &request.params {
            ContentParams::Blog {
                keywords,
                word_count,
            }
            | ContentParams::Seo {
                keywords,
                word_count,
            } => {
                payload["keywords"] = json!(keywords);
                payload["wordCount"] = json!(word_count);
            },
            ContentParams::Social { platform } => {
                payload["platform"] = json!(platform);
            },
        }

        self.post(payload).await?;
        info!(record = %request.id, "content request dispatched");
        Ok(())
    }

    /// Dispatch a resume enhancement request
    async fn dispatch_resume(
        &self,
        record: &ResumeRecord,
        token_cost: i64,
    ) -> Result<(), DispatchError> {
        let payload = json!({
            "userId": record.user_id,
            "userEmail": record.user_email,
            "recordId": record.id,
            "contentType": record.kind.as_str(),
            "fileName": record.file_name,
            "fileUrl": record.file_url,
            "jobUrl": record.job_url,
            "tokenCost": token_cost,
        });

        self.post(payload).await?;
        info!(record = %record.id, "resume enhancement dispatched");
        Ok(())
    }
}
