// External record store access for DraftDesk Backend
// The Account/Content/Resume stores are hosted collaborators reached over
// HTTP; everything here is the narrow interface the rest of the app consumes.

pub mod airtable;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::content::{ContentPatch, ContentRequest, NewContentRequest, RequestStatus};
use crate::models::resume::{NewResumeRecord, ResumePatch, ResumeRecord};
use crate::models::user::{NewUser, User, UserPatch};

pub use airtable::AirtableClient;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Store rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed record: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        StoreError::Network(error.to_string())
    }
}

// =============================================================================
// STORE TRAITS
// =============================================================================

/// Account Store operations: user records keyed by opaque record id,
/// looked up by unique email
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_user(&self, id: &str) -> Result<User, StoreError>;
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, StoreError>;
}

/// Content Store operations: generation requests owned by a user
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_content(
        &self,
        user_email: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ContentRequest>, StoreError>;
    async fn get_content(&self, id: &str) -> Result<ContentRequest, StoreError>;
    async fn create_content(&self, record: NewContentRequest)
        -> Result<ContentRequest, StoreError>;
    async fn update_content(
        &self,
        id: &str,
        patch: ContentPatch,
    ) -> Result<ContentRequest, StoreError>;
}

/// Resume Store operations: uploaded and enhanced resume records
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn list_resumes(
        &self,
        user_email: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ResumeRecord>, StoreError>;
    async fn get_resume(&self, id: &str) -> Result<ResumeRecord, StoreError>;
    async fn create_resume(&self, record: NewResumeRecord) -> Result<ResumeRecord, StoreError>;
    async fn update_resume(
        &self,
        id: &str,
        patch: ResumePatch,
    ) -> Result<ResumeRecord, StoreError>;
}
