// Shared test fixtures: an in-memory record store and a recording
// dispatcher standing in for the external collaborators

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use draftdesk_backend::models::content::{
    ContentPatch, ContentRequest, NewContentRequest, RequestStatus,
};
use draftdesk_backend::models::resume::{NewResumeRecord, ResumePatch, ResumeRecord};
use draftdesk_backend::models::user::{NewUser, User, UserPatch};
use draftdesk_backend::services::dispatch::{DispatchError, Dispatcher};
use draftdesk_backend::services::{ContentService, EntitlementService, ResumeService};
use draftdesk_backend::store::{AccountStore, ContentStore, ResumeStore, StoreError};

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>,
    content: Mutex<HashMap<String, ContentRequest>>,
    resumes: Mutex<HashMap<String, ResumeRecord>>,
    counter: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}{:04}", prefix, n)
    }

    /// Worker write-back: the external fulfillment worker updates status and
    /// output out of band, directly against the store
    pub async fn worker_write_back(
        &self,
        id: &str,
        status: RequestStatus,
        output: Option<String>,
    ) {
        let mut content = self.content.lock().await;
        if let Some(record) = content.get_mut(id) {
            record.status = status;
            record.output = output;
        }
    }

    pub async fn raw_user(&self, id: &str) -> Option<User> {
        self.users.lock().await.get(id).cloned()
    }

    /// Seed a stored user directly, bypassing signup defaults
    pub async fn put_user(&self, user: User) {
        self.users.lock().await.insert(user.id.clone(), user);
    }
}

fn apply_user_patch(user: &mut User, patch: UserPatch) {
    if let Some(tier) = patch.tier {
        user.tier = tier;
    }
    if let Some(end) = patch.subscription_end {
        user.subscription_end = end;
    }
    if let Some(tokens) = patch.tokens {
        user.tokens = tokens;
    }
    if let Some(last_reset) = patch.last_reset {
        user.last_reset = last_reset;
    }
    if let Some(name) = patch.name {
        user.name = Some(name);
    }
    if let Some(phone) = patch.phone {
        user.phone = Some(phone);
    }
    if let Some(company) = patch.company_name {
        user.company_name = Some(company);
    }
    if let Some(website) = patch.website {
        user.website = Some(website);
    }
    if let Some(session) = patch.last_payment_session {
        user.last_payment_session = Some(session);
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let users = self.users.lock().await;
        users.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = User {
            id: self.next_id("recU"),
            email: new_user.email,
            password_hash: new_user.password_hash,
            tier: new_user.tier,
            subscription_end: None,
            tokens: new_user.tokens,
            last_reset: new_user.last_reset,
            name: new_user.name,
            phone: None,
            company_name: None,
            website: None,
            last_payment_session: None,
        };
        self.users
            .lock()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        let user = users.get_mut(id).ok_or(StoreError::NotFound)?;
        apply_user_patch(user, patch);
        Ok(user.clone())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_content(
        &self,
        user_email: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ContentRequest>, StoreError> {
        let content = self.content.lock().await;
        Ok(content
            .values()
            .filter(|r| r.user_email == user_email)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    async fn get_content(&self, id: &str) -> Result<ContentRequest, StoreError> {
        let content = self.content.lock().await;
        content.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn create_content(
        &self,
        record: NewContentRequest,
    ) -> Result<ContentRequest, StoreError> {
        let request = ContentRequest {
            id: self.next_id("recC"),
            user_id: record.user_id,
            user_email: record.user_email,
            content_type: record.content_type,
            details: record.details,
            params: record.params,
            status: record.status,
            output: None,
            created_at: record.created_at,
        };
        self.content
            .lock()
            .await
            .insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn update_content(
        &self,
        id: &str,
        patch: ContentPatch,
    ) -> Result<ContentRequest, StoreError> {
        let mut content = self.content.lock().await;
        let record = content.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(details) = patch.details {
            record.details = details;
        }
        if let Some(params) = patch.params {
            record.params = params;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(output) = patch.output {
            record.output = output;
        }
        Ok(record.clone())
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn list_resumes(
        &self,
        user_email: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ResumeRecord>, StoreError> {
        let resumes = self.resumes.lock().await;
        Ok(resumes
            .values()
            .filter(|r| r.user_email == user_email)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    async fn get_resume(&self, id: &str) -> Result<ResumeRecord, StoreError> {
        let resumes = self.resumes.lock().await;
        resumes.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn create_resume(&self, record: NewResumeRecord) -> Result<ResumeRecord, StoreError> {
        let resume = ResumeRecord {
            id: self.next_id("recR"),
            user_id: record.user_id,
            user_email: record.user_email,
            file_name: record.file_name,
            file_url: record.file_url,
            kind: record.kind,
            job_url: record.job_url,
            status: record.status,
            output: None,
            created_at: record.created_at,
        };
        self.resumes
            .lock()
            .await
            .insert(resume.id.clone(), resume.clone());
        Ok(resume)
    }

    async fn update_resume(
        &self,
        id: &str,
        patch: ResumePatch,
    ) -> Result<ResumeRecord, StoreError> {
        let mut resumes = self.resumes.lock().await;
        let record = resumes.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(output) = patch.output {
            record.output = output;
        }
        Ok(record.clone())
    }
}

// =============================================================================
// RECORDING DISPATCHER
// =============================================================================

/// Stands in for the fulfillment webhook: records every dispatch and can be
/// switched to fail like an unreachable worker
#[derive(Default)]
pub struct RecordingDispatcher {
    pub dispatched: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub async fn dispatch_count(&self) -> usize {
        self.dispatched.lock().await.len()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch_content(
        &self,
        request: &ContentRequest,
        _token_cost: i64,
    ) -> Result<(), DispatchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::Rejected(500));
        }
        self.dispatched.lock().await.push(request.id.clone());
        Ok(())
    }

    async fn dispatch_resume(
        &self,
        record: &ResumeRecord,
        _token_cost: i64,
    ) -> Result<(), DispatchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::Rejected(500));
        }
        self.dispatched.lock().await.push(record.id.clone());
        Ok(())
    }
}

// =============================================================================
// FIXTURE ASSEMBLY
// =============================================================================

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub entitlements: Arc<EntitlementService>,
    pub content: ContentService,
    pub resumes: ResumeService,
}

pub fn harness() -> TestHarness {
    let store = MemoryStore::new();
    let dispatcher = RecordingDispatcher::new();
    let entitlements = Arc::new(EntitlementService::new(store.clone()));
    let content = ContentService::new(store.clone(), entitlements.clone(), dispatcher.clone());
    let resumes = ResumeService::new(store.clone(), entitlements.clone(), dispatcher.clone());
    TestHarness {
        store,
        dispatcher,
        entitlements,
        content,
        resumes,
    }
}

/// Create a signed-up user the way registration does
pub async fn signup(store: &Arc<MemoryStore>, email: &str) -> User {
    store
        .create_user(NewUser::at_signup(
            email.to_string(),
            "$argon2id$test-hash".to_string(),
            None,
        ))
        .await
        .expect("user creation")
}
