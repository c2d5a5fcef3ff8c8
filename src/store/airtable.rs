// Airtable-style record store client
// One HTTP client over three tables (Users, Content, Resumes); every
// operation is a single synchronous round trip with a bounded timeout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::str::FromStr;
use tracing::warn;

use crate::app_config::StoreConfig;
use crate::models::content::{
    ContentParams, ContentPatch, ContentRequest, ContentType, NewContentRequest, RequestStatus,
};
use crate::models::resume::{NewResumeRecord, ResumeKind, ResumePatch, ResumeRecord};
use crate::models::user::{NewUser, SubscriptionTier, User, UserPatch};
use crate::store::{AccountStore, ContentStore, ResumeStore, StoreError};

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<Record>,
}

fn field_str(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn field_i64(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    fields.get(key).and_then(|v| v.as_i64())
}

fn required_str(fields: &Map<String, Value>, key: &str) -> Result<String, StoreError> {
    field_str(fields, key).ok_or_else(|| StoreError::Malformed(format!("missing field {}", key)))
}

fn field_datetime(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    field_str(fields, key).and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Escape a value for interpolation into a filterByFormula string literal
fn formula_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

// =============================================================================
// AIRTABLE CLIENT
// =============================================================================

pub struct AirtableClient {
    http_client: reqwest::Client,
    config: StoreConfig,
}

impl AirtableClient {
    pub fn new(config: StoreConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            config,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_url, self.config.base_id, table
        )
    }

    fn record_url(&self, table: &str, id: &str) -> String {
        format!("{}/{}", self.table_url(table), id)
    }

    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "record store rejected request");
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_record(&self, table: &str, id: &str) -> Result<Record, StoreError> {
        let response = self
            .http_client
            .get(self.record_url(table, id))
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;
        let response = self.check_response(response).await?;
        Ok(response.json::<Record>().await?)
    }

    async fn find_records(&self, table: &str, formula: &str) -> Result<Vec<Record>, StoreError> {
        let response = self
            .http_client
            .get(self.table_url(table))
            .query(&[("filterByFormula", formula)])
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;
        let response = self.check_response(response).await?;
        Ok(response.json::<RecordList>().await?.records)
    }

    async fn create_record(&self, table: &str, fields: Value) -> Result<Record, StoreError> {
        let response = self
            .http_client
            .post(self.table_url(table))
            .bearer_auth(&self.config.api_token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let response = self.check_response(response).await?;
        Ok(response.json::<Record>().await?)
    }

    async fn update_record(
        &self,
        table: &str,
        id: &str,
        fields: Value,
    ) -> Result<Record, StoreError> {
        let response = self
            .http_client
            .patch(self.record_url(table, id))
            .bearer_auth(&self.config.api_token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let response = self.check_response(response).await?;
        Ok(response.json::<Record>().await?)
    }
}

// =============================================================================
// USER MAPPING
// =============================================================================

fn user_from_record(record: Record) -> Result<User, StoreError> {
    let fields = record.fields;

    let tier = match field_str(&fields, "Subscription") {
        Some(s) => SubscriptionTier::from_str(&s).unwrap_or_else(|e| {
            warn!(record = %record.id, "invalid subscription tier, defaulting to Free: {}", e);
            SubscriptionTier::Free
        }),
        None => SubscriptionTier::Free,
    };

    Ok(User {
        email: required_str(&fields, "Email")?,
        password_hash: required_str(&fields, "Password")?,
        tier,
        subscription_end: field_datetime(&fields, "SubscriptionEnd"),
        tokens: field_i64(&fields, "Tokens").unwrap_or(0),
        // A record without a reset timestamp is due immediately
        last_reset: field_datetime(&fields, "LastReset").unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        name: field_str(&fields, "Name"),
        phone: field_str(&fields, "Phone"),
        company_name: field_str(&fields, "CompanyName"),
        website: field_str(&fields, "Website"),
        last_payment_session: field_str(&fields, "LastPaymentSession"),
        id: record.id,
    })
}

fn new_user_fields(new_user: &NewUser) -> Value {
    let mut fields = Map::new();
    fields.insert("Email".to_string(), json!(new_user.email));
    fields.insert("Password".to_string(), json!(new_user.password_hash));
    fields.insert("Subscription".to_string(), json!(new_user.tier.as_str()));
    fields.insert("Tokens".to_string(), json!(new_user.tokens));
    fields.insert(
        "LastReset".to_string(),
        json!(new_user.last_reset.to_rfc3339()),
    );
    if let Some(name) = &new_user.name {
        fields.insert("Name".to_string(), json!(name));
    }
    Value::Object(fields)
}

fn user_patch_fields(patch: &UserPatch) -> Value {
    let mut fields = Map::new();
    if let Some(tier) = patch.tier {
        fields.insert("Subscription".to_string(), json!(tier.as_str()));
    }
    if let Some(end) = &patch.subscription_end {
        let value = match end {
            Some(ts) => json!(ts.to_rfc3339()),
            None => Value::Null,
        };
        fields.insert("SubscriptionEnd".to_string(), value);
    }
    if let Some(tokens) = patch.tokens {
        fields.insert("Tokens".to_string(), json!(tokens));
    }
    if let Some(last_reset) = patch.last_reset {
        fields.insert("LastReset".to_string(), json!(last_reset.to_rfc3339()));
    }
    if let Some(name) = &patch.name {
        fields.insert("Name".to_string(), json!(name));
    }
    if let Some(phone) = &patch.phone {
        fields.insert("Phone".to_string(), json!(phone));
    }
    if let Some(company) = &patch.company_name {
        fields.insert("CompanyName".to_string(), json!(company));
    }
    if let Some(website) = &patch.website {
        fields.insert("Website".to_string(), json!(website));
    }
    if let Some(session) = &patch.last_payment_session {
        fields.insert("LastPaymentSession".to_string(), json!(session));
    }
    Value::Object(fields)
}

#[async_trait]
impl AccountStore for AirtableClient {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let formula = format!("{{Email}}='{}'", formula_escape(email));
        let mut records = self
            .find_records(&self.config.users_table, &formula)
            .await?;
        match records.pop() {
            Some(record) => Ok(Some(user_from_record(record)?)),
            None => Ok(None),
        }
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let record = self.get_record(&self.config.users_table, id).await?;
        user_from_record(record)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let record = self
            .create_record(&self.config.users_table, new_user_fields(&new_user))
            .await?;
        user_from_record(record)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, StoreError> {
        let record = self
            .update_record(&self.config.users_table, id, user_patch_fields(&patch))
            .await?;
        user_from_record(record)
    }
}

// =============================================================================
// CONTENT MAPPING
// =============================================================================

fn content_from_record(record: Record) -> Result<ContentRequest, StoreError> {
    let fields = record.fields;

    let content_type = ContentType::from_str(&required_str(&fields, "ContentType")?)
        .map_err(StoreError::Malformed)?;
    let status =
        RequestStatus::from_str(&required_str(&fields, "Status")?).map_err(StoreError::Malformed)?;
    let params: ContentParams = serde_json::from_str(&required_str(&fields, "Params")?)
        .map_err(|e| StoreError::Malformed(format!("bad params payload: {}", e)))?;

    Ok(ContentRequest {
        user_id: required_str(&fields, "UserID")?,
        user_email: required_str(&fields, "UserEmail")?,
        content_type,
        details: field_str(&fields, "Details").unwrap_or_default(),
        params,
        status,
        output: field_str(&fields, "Output"),
        created_at: field_datetime(&fields, "CreatedAt").unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        id: record.id,
    })
}

fn new_content_fields(record: &NewContentRequest) -> Result<Value, StoreError> {
    let params = serde_json::to_string(&record.params)
        .map_err(|e| StoreError::Malformed(format!("unserializable params: {}", e)))?;
    Ok(json!({
        "UserID": record.user_id,
        "UserEmail": record.user_email,
        "ContentType": record.content_type.as_str(),
        "Details": record.details,
        "Params": params,
        "Status": record.status.as_str(),
        "CreatedAt": record.created_at.to_rfc3339(),
    }))
}

fn content_patch_fields(patch: &ContentPatch) -> Result<Value, StoreError> {
    let mut fields = Map::new();
    if let Some(details) = &patch.details {
        fields.insert("Details".to_string(), json!(details));
    }
    if let Some(params) = &patch.params {
        let params = serde_json::to_string(params)
            .map_err(|e| StoreError::Malformed(format!("unserializable params: {}", e)))?;
        fields.insert("Params".to_string(), json!(params));
    }
    if let Some(status) = patch.status {
        fields.insert("Status".to_string(), json!(status.as_str()));
    }
    if let Some(output) = &patch.output {
        let value = match output {
            Some(text) => json!(text),
            None => Value::Null,
        };
        fields.insert("Output".to_string(), value);
    }
    Ok(Value::Object(fields))
}

fn ownership_formula(user_email: &str, status: Option<RequestStatus>) -> String {
    match status {
        Some(status) => format!(
            "AND({{UserEmail}}='{}',{{Status}}='{}')",
            formula_escape(user_email),
            status.as_str()
        ),
        None => format!("{{UserEmail}}='{}'", formula_escape(user_email)),
    }
}

#[async_trait]
impl ContentStore for AirtableClient {
    async fn list_content(
        &self,
        user_email: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ContentRequest>, StoreError> {
        let formula = ownership_formula(user_email, status);
        let records = self
            .find_records(&self.config.content_table, &formula)
            .await?;
        records.into_iter().map(content_from_record).collect()
    }

    async fn get_content(&self, id: &str) -> Result<ContentRequest, StoreError> {
        let record = self.get_record(&self.config.content_table, id).await?;
        content_from_record(record)
    }

    async fn create_content(
        &self,
        record: NewContentRequest,
    ) -> Result<ContentRequest, StoreError> {
        let fields = new_content_fields(&record)?;
        let created = self.create_record(&self.config.content_table, fields).await?;
        content_from_record(created)
    }

    async fn update_content(
        &self,
        id: &str,
        patch: ContentPatch,
    ) -> Result<ContentRequest, StoreError> {
        let fields = content_patch_fields(&patch)?;
        let updated = self
            .update_record(&self.config.content_table, id, fields)
            .await?;
        content_from_record(updated)
    }
}

// =============================================================================
// RESUME MAPPING
// =============================================================================

fn resume_from_record(record: Record) -> Result<ResumeRecord, StoreError> {
    let fields = record.fields;

    let kind =
        ResumeKind::from_str(&required_str(&fields, "Kind")?).map_err(StoreError::Malformed)?;
    let status =
        RequestStatus::from_str(&required_str(&fields, "Status")?).map_err(StoreError::Malformed)?;

    Ok(ResumeRecord {
        user_id: required_str(&fields, "UserID")?,
        user_email: required_str(&fields, "UserEmail")?,
        file_name: required_str(&fields, "FileName")?,
        file_url: required_str(&fields, "FileUrl")?,
        kind,
        job_url: field_str(&fields, "JobUrl"),
        status,
        output: field_str(&fields, "Output"),
        created_at: field_datetime(&fields, "CreatedAt").unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        id: record.id,
    })
}

fn new_resume_fields(record: &NewResumeRecord) -> Value {
    let mut fields = Map::new();
    fields.insert("UserID".to_string(), json!(record.user_id));
    fields.insert("UserEmail".to_string(), json!(record.user_email));
    fields.insert("FileName".to_string(), json!(record.file_name));
    fields.insert("FileUrl".to_string(), json!(record.file_url));
    fields.insert("Kind".to_string(), json!(record.kind.as_str()));
    if let Some(job_url) = &record.job_url {
        fields.insert("JobUrl".to_string(), json!(job_url));
    }
    fields.insert("Status".to_string(), json!(record.status.as_str()));
    fields.insert(
        "CreatedAt".to_string(),
        json!(record.created_at.to_rfc3339()),
    );
    Value::Object(fields)
}

fn resume_patch_fields(patch: &ResumePatch) -> Value {
    let mut fields = Map::new();
    if let Some(status) = patch.status {
        fields.insert("Status".to_string(), json!(status.as_str()));
    }
    if let Some(output) = &patch.output {
        let value = match output {
            Some(text) => json!(text),
            None => Value::Null,
        };
        fields.insert("Output".to_string(), value);
    }
    Value::Object(fields)
}

#[async_trait]
impl ResumeStore for AirtableClient {
    async fn list_resumes(
        &self,
        user_email: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ResumeRecord>, StoreError> {
        let formula = ownership_formula(user_email, status);
        let records = self
            .find_records(&self.config.resumes_table, &formula)
            .await?;
        records.into_iter().map(resume_from_record).collect()
    }

    async fn get_resume(&self, id: &str) -> Result<ResumeRecord, StoreError> {
        let record = self.get_record(&self.config.resumes_table, id).await?;
        resume_from_record(record)
    }

    async fn create_resume(&self, record: NewResumeRecord) -> Result<ResumeRecord, StoreError> {
        let fields = new_resume_fields(&record);
        let created = self.create_record(&self.config.resumes_table, fields).await?;
        resume_from_record(created)
    }

    async fn update_resume(
        &self,
        id: &str,
        patch: ResumePatch,
    ) -> Result<ResumeRecord, StoreError> {
        let fields = resume_patch_fields(&patch);
        let updated = self
            .update_record(&self.config.resumes_table, id, fields)
            .await?;
        resume_from_record(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_escaping() {
        assert_eq!(formula_escape("plain@example.com"), "plain@example.com");
        assert_eq!(formula_escape("o'brien@example.com"), "o\\'brien@example.com");
    }

    #[test]
    fn test_ownership_formula() {
        assert_eq!(
            ownership_formula("a@b.com", None),
            "{UserEmail}='a@b.com'"
        );
        assert_eq!(
            ownership_formula("a@b.com", Some(RequestStatus::Failed)),
            "AND({UserEmail}='a@b.com',{Status}='Failed')"
        );
    }

    #[test]
    fn test_user_from_record_defaults() {
        let raw = json!({
            "id": "recABC",
            "fields": {
                "Email": "a@b.com",
                "Password": "$argon2id$hash",
            }
        });
        let record: Record = serde_json::from_value(raw).unwrap();
        let user = user_from_record(record).unwrap();

        assert_eq!(user.id, "recABC");
        assert_eq!(user.tier, SubscriptionTier::Free);
        assert_eq!(user.tokens, 0);
        // Missing LastReset is due immediately
        assert_eq!(user.last_reset, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_user_from_record_missing_email_rejected() {
        let raw = json!({ "id": "recABC", "fields": { "Password": "x" } });
        let record: Record = serde_json::from_value(raw).unwrap();
        assert!(matches!(
            user_from_record(record),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = UserPatch {
            tokens: Some(8),
            ..Default::default()
        };
        let fields = user_patch_fields(&patch);
        let object = fields.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object.get("Tokens"), Some(&json!(8)));
    }

    #[test]
    fn test_patch_clears_nullable_fields() {
        let patch = UserPatch {
            subscription_end: Some(None),
            ..Default::default()
        };
        let fields = user_patch_fields(&patch);
        assert_eq!(
            fields.as_object().unwrap().get("SubscriptionEnd"),
            Some(&Value::Null)
        );
    }

    #[test]
    fn test_content_round_trip_through_wire_format() {
        let new_record = NewContentRequest {
            user_id: "recUSER".to_string(),
            user_email: "a@b.com".to_string(),
            content_type: ContentType::BlogPost,
            details: "topic: rust web services".to_string(),
            params: ContentParams::Blog {
                keywords: vec!["rust".to_string()],
                word_count: 1200,
            },
            status: RequestStatus::Requested,
            created_at: Utc::now(),
        };

        let fields = new_content_fields(&new_record).unwrap();
        let record: Record = serde_json::from_value(json!({
            "id": "recCONTENT",
            "fields": fields,
        }))
        .unwrap();

        let request = content_from_record(record).unwrap();
        assert_eq!(request.content_type, ContentType::BlogPost);
        assert_eq!(request.status, RequestStatus::Requested);
        assert_eq!(request.params, new_record.params);
        assert_eq!(request.output, None);
    }
}
