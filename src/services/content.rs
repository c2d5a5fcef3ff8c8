// Content request lifecycle service
// Submission debits tokens before the record is created; the external
// worker owns every transition out of Requested except user cancellation.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::content::{
    ContentParams, ContentPatch, ContentRequest, NewContentRequest, RequestStatus,
};
use crate::models::user::User;
use crate::services::dispatch::Dispatcher;
use crate::services::entitlement::EntitlementService;
use crate::store::ContentStore;
use crate::utils::service_error::ServiceError;

pub struct ContentService {
    content: Arc<dyn ContentStore>,
    entitlements: Arc<EntitlementService>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ContentService {
    pub fn new(
        content: Arc<dyn ContentStore>,
        entitlements: Arc<EntitlementService>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            content,
            entitlements,
            dispatcher,
        }
    }

    /// Submit a new generation request: debit first, then create the record,
    /// then hand off to the worker. A dispatch failure leaves the debited
    /// Requested record in place and is surfaced to the caller.
    pub async fn submit(
        &self,
        user_id: &str,
        details: String,
        params: ContentParams,
    ) -> Result<ContentRequest, ServiceError> {
        let (user, _) = self.entitlements.effective_entitlement(user_id).await?;

        let cost = params.token_cost();
        let user = self.entitlements.debit_tokens(&user, cost).await?;

        let record = self
            .content
            .create_content(NewContentRequest {
                user_id: user.id.clone(),
                user_email: user.email.clone(),
                content_type: params.content_type(),
                details,
                params,
                status: RequestStatus::Requested,
                created_at: Utc::now(),
            })
            .await?;

        if let Err(e) = self.dispatcher.dispatch_content(&record, cost).await {
            warn!(record = %record.id, "dispatch failed after debit: {}", e);
            return Err(ServiceError::DispatchFailed);
        }

        info!(record = %record.id, cost, "content request submitted");
        Ok(record)
    }

    /// List a user's requests. Without an explicit status filter, Cancelled
    /// items are excluded; with one, exactly that status is returned.
    pub async fn list(
        &self,
        user: &User,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ContentRequest>, ServiceError> {
        let records = match status {
            Some(_) => self.content.list_content(&user.email, status).await?,
            None => self
                .content
                .list_content(&user.email, None)
                .await?
                .into_iter()
                .filter(|r| r.status != RequestStatus::Cancelled)
                .collect(),
        };
        Ok(records)
    }

    /// Fetch one request, enforcing ownership. A foreign record reads as
    /// missing rather than forbidden.
    pub async fn get(&self, user: &User, id: &str) -> Result<ContentRequest, ServiceError> {
        let record = self.content.get_content(id).await?;
        if record.user_id != user.id {
            return Err(ServiceError::NotFound);
        }
        Ok(record)
    }

    /// Cancel a request that has not been delivered yet
    pub async fn cancel(&self, user: &User, id: &str) -> Result<ContentRequest, ServiceError> {
        let record = self.get(user, id).await?;
        if !record.status.can_cancel() {
            return Err(ServiceError::InvalidTransition {
                from: record.status,
                action: "cancel",
            });
        }

        let updated = self
            .content
            .update_content(
                &record.id,
                ContentPatch {
                    status: Some(RequestStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;
        info!(record = %record.id, "content request cancelled");
        Ok(updated)
    }

    /// Edit a delivered request in place ("Save Changes"): details and/or
    /// output text change, status does not
    pub async fn save_changes(
        &self,
        user: &User,
        id: &str,
        details: Option<String>,
        output: Option<String>,
    ) -> Result<ContentRequest, ServiceError> {
        let record = self.get(user, id).await?;
        if !record.status.can_edit() {
            return Err(ServiceError::InvalidTransition {
                from: record.status,
                action: "edit",
            });
        }

        let updated = self
            .content
            .update_content(
                &record.id,
                ContentPatch {
                    details,
                    output: output.map(Some),
                    ..Default::default()
                },
            )
            .await?;
        Ok(updated)
    }

    /// Resubmit a failed request, optionally with edited details. The prior
    /// output is cleared and the record re-enters the front of the pipeline.
    /// The original debit paid for work never delivered, so resubmission is
    /// free.
    pub async fn resubmit(
        &self,
        user: &User,
        id: &str,
        details: Option<String>,
        params: Option<ContentParams>,
    ) -> Result<ContentRequest, ServiceError> {
        let record = self.get(user, id).await?;
        if !record.status.can_resubmit() {
            return Err(ServiceError::InvalidTransition {
                from: record.status,
                action: "resubmit",
            });
        }
        validate_params_type(&record, params.as_ref())?;

        let cost = params
            .as_ref()
            .unwrap_or(&record.params)
            .token_cost();

        let updated = self
            .content
            .update_content(
                &record.id,
                ContentPatch {
                    details,
                    params,
                    status: Some(RequestStatus::Requested),
                    output: Some(None),
                },
            )
            .await?;

        if let Err(e) = self.dispatcher.dispatch_content(&updated, cost).await {
            warn!(record = %updated.id, "dispatch failed on resubmit: {}", e);
            return Err(ServiceError::DispatchFailed);
        }

        info!(record = %updated.id, "content request resubmitted");
        Ok(updated)
    }

    /// "Save & Regenerate" on a delivered request: a fresh debit, output
    /// cleared, back to Requested and re-dispatched
    pub async fn regenerate(
        &self,
        user_id: &str,
        id: &str,
        details: Option<String>,
        params: Option<ContentParams>,
    ) -> Result<ContentRequest, ServiceError> {
        let (user, _) = self.entitlements.effective_entitlement(user_id).await?;
        let record = self.get(&user, id).await?;
        if !record.status.can_edit() {
            return Err(ServiceError::InvalidTransition {
                from: record.status,
                action: "regenerate",
            });
        }
        validate_params_type(&record, params.as_ref())?;

        let cost = params
            .as_ref()
            .unwrap_or(&record.params)
            .token_cost();
        self.entitlements.debit_tokens(&user, cost).await?;

        let updated = self
            .content
            .update_content(
                &record.id,
                ContentPatch {
                    details,
                    params,
                    status: Some(RequestStatus::Requested),
                    output: Some(None),
                },
            )
            .await?;

        if let Err(e) = self.dispatcher.dispatch_content(&updated, cost).await {
            warn!(record = %updated.id, "dispatch failed on regenerate: {}", e);
            return Err(ServiceError::DispatchFailed);
        }

        info!(record = %updated.id, cost, "content request regenerated");
        Ok(updated)
    }
}

/// Edited params may change keywords or word counts but never the content
/// type of an existing record
fn validate_params_type(
    record: &ContentRequest,
    params: Option<&ContentParams>,
) -> Result<(), ServiceError> {
    if let Some(params) = params {
        if params.content_type() != record.content_type {
            return Err(ServiceError::Validation(
                "content type of an existing request cannot be changed".to_string(),
            ));
        }
    }
    Ok(())
}
