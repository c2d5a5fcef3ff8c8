// Resume record handlers
// Upload registration, enhancement requests, listing and cancellation

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::content::RequestStatus,
    models::resume::ResumeRecord,
    utils::{service_error::ServiceError, trim_and_validate_field, trim_optional_field},
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterResumeRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "File name must be between 1 and 255 characters"
    ))]
    pub file_name: String,

    #[validate(url(message = "File URL must be a valid URL"))]
    pub file_url: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct EnhanceResumeRequest {
    /// Target job posting; present makes this a Targeted enhancement
    #[validate(url(message = "Job URL must be a valid URL"))]
    pub job_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListResumesQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResumeItemResponse {
    pub id: String,
    pub file_name: String,
    pub file_url: String,
    pub kind: String,
    pub job_url: Option<String>,
    pub status: String,
    pub output: Option<String>,
    pub created_at: String,
}

impl From<ResumeRecord> for ResumeItemResponse {
    fn from(record: ResumeRecord) -> Self {
        Self {
            id: record.id,
            file_name: record.file_name,
            file_url: record.file_url,
            kind: record.kind.as_str().to_string(),
            job_url: record.job_url,
            status: record.status.as_str().to_string(),
            output: record.output,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResumeListResponse {
    pub items: Vec<ResumeItemResponse>,
    pub total: usize,
}

// =============================================================================
// RESUME HANDLERS
// =============================================================================

/// POST /resumes - Register an uploaded resume (no tokens involved)
#[utoipa::path(
    post,
    path = "/v1/resumes",
    tag = "Resumes",
    operation_id = "registerResume",
    request_body = RegisterResumeRequest,
    responses(
        (status = 201, description = "Upload registered", body = ResumeItemResponse),
        (status = 400, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn register_resume(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<RegisterResumeRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let file_name = match trim_and_validate_field(&request.file_name, true) {
        Ok(name) => name,
        Err(e) => return ServiceError::Validation(e).into_response(),
    };

    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state
        .resume_service
        .register_upload(&user, file_name, request.file_url)
        .await
    {
        Ok(record) => (StatusCode::CREATED, Json(ResumeItemResponse::from(record))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /resumes - List the caller's resume records
#[utoipa::path(
    get,
    path = "/v1/resumes",
    tag = "Resumes",
    operation_id = "listResumes",
    params(("status" = Option<String>, Query, description = "Explicit status filter")),
    responses(
        (status = 200, description = "Resume records", body = ResumeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_resumes(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListResumesQuery>,
) -> impl IntoResponse {
    let status = match query.status {
        Some(s) => match RequestStatus::from_str(&s) {
            Ok(status) => Some(status),
            Err(e) => return ServiceError::Validation(e).into_response(),
        },
        None => None,
    };

    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.resume_service.list(&user, status).await {
        Ok(records) => {
            let items: Vec<ResumeItemResponse> =
                records.into_iter().map(ResumeItemResponse::from).collect();
            let total = items.len();
            (StatusCode::OK, Json(ResumeListResponse { items, total })).into_response()
        },
        Err(e) => e.into_response(),
    }
}

/// POST /resumes/{id}/enhance - Request an enhancement (debits tokens)
#[utoipa::path(
    post,
    path = "/v1/resumes/{id}/enhance",
    tag = "Resumes",
    operation_id = "enhanceResume",
    params(("id" = String, Path, description = "Source resume record id")),
    request_body = EnhanceResumeRequest,
    responses(
        (status = 201, description = "Enhancement requested", body = ResumeItemResponse),
        (status = 402, description = "Insufficient tokens"),
        (status = 404, description = "Not found"),
        (status = 502, description = "Dispatch or store failure")
    ),
    security(("bearerAuth" = []))
)]
pub async fn enhance_resume(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<EnhanceResumeRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let job_url = trim_optional_field(request.job_url.as_ref());

    match state
        .resume_service
        .enhance(&auth_user.user_id, &id, job_url)
        .await
    {
        Ok(record) => (StatusCode::CREATED, Json(ResumeItemResponse::from(record))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /resumes/{id}/cancel - Cancel an undelivered enhancement
#[utoipa::path(
    post,
    path = "/v1/resumes/{id}/cancel",
    tag = "Resumes",
    operation_id = "cancelResume",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Enhancement cancelled", body = ResumeItemResponse),
        (status = 404, description = "Not found"),
        (status = 409, description = "Record cannot be cancelled")
    ),
    security(("bearerAuth" = []))
)]
pub async fn cancel_resume(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.resume_service.cancel(&user, &id).await {
        Ok(record) => (StatusCode::OK, Json(ResumeItemResponse::from(record))).into_response(),
        Err(e) => e.into_response(),
    }
}
