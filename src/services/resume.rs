// Resume record service
// Uploads are free bookkeeping records; enhancements debit a flat cost and
// go through the same dispatch-and-wait lifecycle as content requests.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::content::RequestStatus;
use crate::models::resume::{
    NewResumeRecord, ResumeKind, ResumePatch, ResumeRecord, RESUME_ENHANCE_COST,
};
use crate::models::user::User;
use crate::services::dispatch::Dispatcher;
use crate::services::entitlement::EntitlementService;
use crate::store::ResumeStore;
use crate::utils::service_error::ServiceError;

pub struct ResumeService {
    resumes: Arc<dyn ResumeStore>,
    entitlements: Arc<EntitlementService>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ResumeService {
    pub fn new(
        resumes: Arc<dyn ResumeStore>,
        entitlements: Arc<EntitlementService>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            resumes,
            entitlements,
            dispatcher,
        }
    }

    /// Record an uploaded resume. The file itself lives wherever the UI put
    /// it; only the reference is stored. No tokens are involved.
    pub async fn register_upload(
        &self,
        user: &User,
        file_name: String,
        file_url: String,
    ) -> Result<ResumeRecord, ServiceError> {
        let record = self
            .resumes
            .create_resume(NewResumeRecord {
                user_id: user.id.clone(),
                user_email: user.email.clone(),
                file_name,
                file_url,
                kind: ResumeKind::UserUploaded,
                job_url: None,
                status: RequestStatus::Completed,
                created_at: Utc::now(),
            })
            .await?;
        info!(record = %record.id, "resume upload registered");
        Ok(record)
    }

    /// Request an enhancement of an uploaded resume. Creates a new record of
    /// the enhanced kind, debits the flat cost and dispatches to the worker.
    /// A job-target URL makes it a Targeted enhancement and is required for
    /// one.
    pub async fn enhance(
        &self,
        user_id: &str,
        source_id: &str,
        job_url: Option<String>,
    ) -> Result<ResumeRecord, ServiceError> {
        let (user, _) = self.entitlements.effective_entitlement(user_id).await?;
        let source = self.get(&user, source_id).await?;

        let kind = match job_url {
            Some(_) => ResumeKind::TargetedEnhanced,
            None => ResumeKind::BasicEnhanced,
        };

        let user = self
            .entitlements
            .debit_tokens(&user, RESUME_ENHANCE_COST)
            .await?;

        let record = self
            .resumes
            .create_resume(NewResumeRecord {
                user_id: user.id.clone(),
                user_email: user.email.clone(),
                file_name: source.file_name.clone(),
                file_url: source.file_url.clone(),
                kind,
                job_url,
                status: RequestStatus::Requested,
                created_at: Utc::now(),
            })
            .await?;

        if let Err(e) = self
            .dispatcher
            .dispatch_resume(&record, RESUME_ENHANCE_COST)
            .await
        {
            warn!(record = %record.id, "dispatch failed after debit: {}", e);
            return Err(ServiceError::DispatchFailed);
        }

        info!(record = %record.id, kind = kind.as_str(), "resume enhancement requested");
        Ok(record)
    }

    /// List a user's resume records; same default filter as content
    /// listings — Cancelled is excluded unless asked for explicitly
    pub async fn list(
        &self,
        user: &User,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ResumeRecord>, ServiceError> {
        let records = match status {
            Some(_) => self.resumes.list_resumes(&user.email, status).await?,
            None => self
                .resumes
                .list_resumes(&user.email, None)
                .await?
                .into_iter()
                .filter(|r| r.status != RequestStatus::Cancelled)
                .collect(),
        };
        Ok(records)
    }

    /// Fetch one record, enforcing ownership
    pub async fn get(&self, user: &User, id: &str) -> Result<ResumeRecord, ServiceError> {
        let record = self.resumes.get_resume(id).await?;
        if record.user_id != user.id {
            return Err(ServiceError::NotFound);
        }
        Ok(record)
    }

    /// Cancel an enhancement that has not been delivered yet
    pub async fn cancel(&self, user: &User, id: &str) -> Result<ResumeRecord, ServiceError> {
        let record = self.get(user, id).await?;
        if !record.status.can_cancel() {
            return Err(ServiceError::InvalidTransition {
                from: record.status,
                action: "cancel",
            });
        }

        let updated = self
            .resumes
            .update_resume(
                &record.id,
                ResumePatch {
                    status: Some(RequestStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;
        info!(record = %record.id, "resume enhancement cancelled");
        Ok(updated)
    }
}
