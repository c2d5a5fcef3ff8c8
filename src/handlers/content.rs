// Content request handlers
// Submission, listing, cancellation, resubmission and in-place edits

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
    models::content::{ContentParams, ContentRequest, RequestStatus},
    utils::service_error::ServiceError,
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SubmitContentRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Details must be between 1 and 10000 characters"
    ))]
    pub details: String,

    /// Tagged parameters selecting the content type
    #[schema(value_type = Object)]
    pub params: ContentParams,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct EditContentRequest {
    #[validate(length(max = 10000, message = "Details must be less than 10000 characters"))]
    pub details: Option<String>,

    pub output: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct ResubmitContentRequest {
    #[validate(length(max = 10000, message = "Details must be less than 10000 characters"))]
    pub details: Option<String>,

    /// Edited parameters; the content type itself cannot change
    #[schema(value_type = Object)]
    pub params: Option<ContentParams>,
}

#[derive(Debug, Deserialize)]
pub struct ListContentQuery {
    /// Explicit status filter; without it, Cancelled items are excluded
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContentItemResponse {
    pub id: String,
    pub content_type: String,
    pub details: String,
    #[schema(value_type = Object)]
    pub params: ContentParams,
    pub status: String,
    pub output: Option<String>,
    pub created_at: String,
    pub token_cost: i64,
}

impl From<ContentRequest> for ContentItemResponse {
    fn from(record: ContentRequest) -> Self {
        Self {
            id: record.id,
            content_type: record.content_type.as_str().to_string(),
            details: record.details,
            status: record.status.as_str().to_string(),
            output: record.output,
            created_at: record.created_at.to_rfc3339(),
            token_cost: record.params.token_cost(),
            params: record.params,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContentListResponse {
    pub items: Vec<ContentItemResponse>,
    pub total: usize,
}

fn parse_status_filter(raw: Option<String>) -> Result<Option<RequestStatus>, ServiceError> {
    match raw {
        Some(s) => RequestStatus::from_str(&s)
            .map(Some)
            .map_err(ServiceError::Validation),
        None => Ok(None),
    }
}

// =============================================================================
// CONTENT HANDLERS
// =============================================================================

/// POST /content - Submit a generation request (debits tokens)
#[utoipa::path(
    post,
    path = "/v1/content",
    tag = "Content",
    operation_id = "submitContent",
    request_body = SubmitContentRequest,
    responses(
        (status = 201, description = "Request submitted", body = ContentItemResponse),
        (status = 400, description = "Validation failed"),
        (status = 402, description = "Insufficient tokens"),
        (status = 502, description = "Dispatch or store failure")
    ),
    security(("bearerAuth" = []))
)]
pub async fn submit_content(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<SubmitContentRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    match state
        .content_service
        .submit(&auth_user.user_id, request.details, request.params)
        .await
    {
        Ok(record) => (
            StatusCode::CREATED,
            Json(ContentItemResponse::from(record)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /content - List the caller's requests
#[utoipa::path(
    get,
    path = "/v1/content",
    tag = "Content",
    operation_id = "listContent",
    params(("status" = Option<String>, Query, description = "Explicit status filter")),
    responses(
        (status = 200, description = "Requests", body = ContentListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_content(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListContentQuery>,
) -> impl IntoResponse {
    let status = match parse_status_filter(query.status) {
        Ok(status) => status,
        Err(e) => return e.into_response(),
    };

    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.content_service.list(&user, status).await {
        Ok(records) => {
            let items: Vec<ContentItemResponse> =
                records.into_iter().map(ContentItemResponse::from).collect();
            let total = items.len();
            (
                StatusCode::OK,
                Json(ContentListResponse { items, total }),
            )
                .into_response()
        },
        Err(e) => e.into_response(),
    }
}

/// GET /content/{id} - Fetch one request
#[utoipa::path(
    get,
    path = "/v1/content/{id}",
    tag = "Content",
    operation_id = "getContent",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Request", body = ContentItemResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_content(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.content_service.get(&user, &id).await {
        Ok(record) => (StatusCode::OK, Json(ContentItemResponse::from(record))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /content/{id} - "Save Changes": edit a delivered request in place
#[utoipa::path(
    put,
    path = "/v1/content/{id}",
    tag = "Content",
    operation_id = "editContent",
    params(("id" = String, Path, description = "Record id")),
    request_body = EditContentRequest,
    responses(
        (status = 200, description = "Request updated", body = ContentItemResponse),
        (status = 404, description = "Not found"),
        (status = 409, description = "Request is not editable")
    ),
    security(("bearerAuth" = []))
)]
pub async fn edit_content(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<EditContentRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state
        .content_service
        .save_changes(&user, &id, request.details, request.output)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(ContentItemResponse::from(record))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /content/{id}/cancel - Cancel an undelivered request
#[utoipa::path(
    post,
    path = "/v1/content/{id}/cancel",
    tag = "Content",
    operation_id = "cancelContent",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Request cancelled", body = ContentItemResponse),
        (status = 404, description = "Not found"),
        (status = 409, description = "Request cannot be cancelled")
    ),
    security(("bearerAuth" = []))
)]
pub async fn cancel_content(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.content_service.cancel(&user, &id).await {
        Ok(record) => (StatusCode::OK, Json(ContentItemResponse::from(record))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /content/{id}/resubmit - Re-enter a failed request into the pipeline
#[utoipa::path(
    post,
    path = "/v1/content/{id}/resubmit",
    tag = "Content",
    operation_id = "resubmitContent",
    params(("id" = String, Path, description = "Record id")),
    request_body = ResubmitContentRequest,
    responses(
        (status = 200, description = "Request resubmitted", body = ContentItemResponse),
        (status = 404, description = "Not found"),
        (status = 409, description = "Only failed requests can be resubmitted")
    ),
    security(("bearerAuth" = []))
)]
pub async fn resubmit_content(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<ResubmitContentRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let user = match state.accounts.get_user(&auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state
        .content_service
        .resubmit(&user, &id, request.details, request.params)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(ContentItemResponse::from(record))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /content/{id}/regenerate - "Save & Regenerate": fresh debit, output
/// cleared, back to Requested
#[utoipa::path(
    post,
    path = "/v1/content/{id}/regenerate",
    tag = "Content",
    operation_id = "regenerateContent",
    params(("id" = String, Path, description = "Record id")),
    request_body = ResubmitContentRequest,
    responses(
        (status = 200, description = "Request regenerating", body = ContentItemResponse),
        (status = 402, description = "Insufficient tokens"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Only completed requests can be regenerated")
    ),
    security(("bearerAuth" = []))
)]
pub async fn regenerate_content(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<ResubmitContentRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    match state
        .content_service
        .regenerate(&auth_user.user_id, &id, request.details, request.params)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(ContentItemResponse::from(record))).into_response(),
        Err(e) => e.into_response(),
    }
}
