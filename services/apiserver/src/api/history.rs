//! Check history handlers.
//!
//! # Purpose
//! CRUD over scanned check records. Every per-record route follows the same
//! order: permission pre-check, load (404 when absent), ownership decision,
//! then the mutation.
//!
//! # Security considerations
//! - A missing record is reported as 404 before ownership is considered.
//! - Non-elevated callers only ever see their own records in listings.
use crate::api::error::{ApiError, api_internal, api_validation_error};
use crate::api::types::{
    CheckListResponse, CreateCheckRequest, DeleteResponse, UpdateCheckRequest,
};
use crate::api::{authorize, precheck};
use crate::app::AppState;
use crate::auth::Caller;
use crate::model::{CheckRecord, CheckUpdate, NewCheck};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkvault_authz::{Action, AuthzError, Gate, IdentityClaim, Resource};

const OWNER_FIELD: &str = "user_id";

async fn load_check(state: &AppState, id: i64) -> Result<CheckRecord, ApiError> {
    state
        .store
        .get_check(id)
        .await
        .map_err(|err| api_internal("failed to load record", &err))?
        .ok_or_else(|| AuthzError::NotFound("record").into())
}

/// Permission pre-check, load, then ownership.
async fn load_authorized(
    state: &AppState,
    claim: &IdentityClaim,
    action: Action,
    id: i64,
) -> Result<CheckRecord, ApiError> {
    let gate: Gate = precheck(
        state
            .guard
            .pre_check(claim, Resource::Checks, action, OWNER_FIELD)
            .admit(),
    )?;
    let record = load_check(state, id).await?;
    authorize(gate.complete(&record))?;
    Ok(record)
}

#[utoipa::path(
    get,
    path = "/api/history",
    tag = "history",
    responses(
        (status = 200, description = "Visible check records, newest first", body = CheckListResponse),
        (status = 401, description = "Missing or invalid credential", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// List every record for callers granted `checks:read_all`, otherwise only
/// the caller's own.
pub(crate) async fn list_checks(
    State(state): State<AppState>,
    Caller(claim): Caller,
) -> Result<Json<CheckListResponse>, ApiError> {
    authorize(
        state
            .guard
            .require_permission(&claim, Resource::Checks, Action::List),
    )?;
    let items = if state.guard.can_read_all(&claim, Resource::Checks) {
        state.store.list_checks().await
    } else {
        state.store.list_checks_for_owner(claim.id).await
    }
    .map_err(|err| api_internal("failed to list records", &err))?;
    Ok(Json(CheckListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/history",
    tag = "history",
    request_body = CreateCheckRequest,
    responses(
        (status = 201, description = "Record created", body = CheckRecord),
        (status = 400, description = "Missing content", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Store a new check record owned by the caller.
///
/// # What it does
/// Requires `checks:create`, then persists the record with `user_id` taken
/// from the verified claim. Any owner named in the payload is ignored.
///
/// # Errors
/// - 400 when `content` is missing or blank.
/// - 403 when the role lacks `checks:create`.
pub(crate) async fn create_check(
    State(state): State<AppState>,
    Caller(claim): Caller,
    Json(body): Json<CreateCheckRequest>,
) -> Result<(StatusCode, Json<CheckRecord>), ApiError> {
    authorize(
        state
            .guard
            .require_permission(&claim, Resource::Checks, Action::Create),
    )?;
    let Some(content) = body.content.filter(|content| !content.trim().is_empty()) else {
        return Err(api_validation_error("content required"));
    };
    let record = state
        .store
        .create_check(NewCheck {
            user_id: claim.id,
            content,
            meta: body.meta,
        })
        .await
        .map_err(|err| api_internal("failed to create record", &err))?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/history/{id}",
    tag = "history",
    params(("id" = i64, Path, description = "Record identifier")),
    responses(
        (status = 200, description = "Check record", body = CheckRecord),
        (status = 403, description = "Not the owner", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Fetch one check record.
///
/// # What it does
/// Runs the `checks:read` pre-check, loads the record, then completes the
/// ownership decision against its `user_id`.
///
/// # Why it exists
/// It is the read side of ownership delegation: elevated callers read any
/// record, everyone else only their own.
///
/// # Errors
/// - 404 when the record does not exist, before ownership is considered.
/// - 403 when a non-elevated caller does not own the record.
pub(crate) async fn get_check(
    State(state): State<AppState>,
    Caller(claim): Caller,
    Path(id): Path<i64>,
) -> Result<Json<CheckRecord>, ApiError> {
    let record = load_authorized(&state, &claim, Action::Read, id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    put,
    path = "/api/history/{id}",
    tag = "history",
    params(("id" = i64, Path, description = "Record identifier")),
    request_body = UpdateCheckRequest,
    responses(
        (status = 200, description = "Updated record", body = CheckRecord),
        (status = 400, description = "Nothing to update", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Replace the content or metadata of a check record.
///
/// # What it does
/// Applies the same pre-check, load and ownership sequence as reads with
/// `checks:update`, then writes the provided fields and stamps `updated_at`.
///
/// # Errors
/// - 400 when no field is provided or `content` is blank.
/// - 403 when the caller neither owns the record nor holds an elevated role.
/// - 404 when the record does not exist.
pub(crate) async fn update_check(
    State(state): State<AppState>,
    Caller(claim): Caller,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCheckRequest>,
) -> Result<Json<CheckRecord>, ApiError> {
    load_authorized(&state, &claim, Action::Update, id).await?;
    let update = CheckUpdate {
        content: body.content,
        meta: body.meta,
    };
    if update.is_empty() {
        return Err(api_validation_error("no fields to update"));
    }
    if update
        .content
        .as_deref()
        .is_some_and(|content| content.trim().is_empty())
    {
        return Err(api_validation_error("content must not be empty"));
    }
    let record = state
        .store
        .update_check(id, update)
        .await
        .map_err(|err| api_internal("failed to update record", &err))?
        .ok_or(AuthzError::NotFound("record"))?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/history/{id}",
    tag = "history",
    params(("id" = i64, Path, description = "Record identifier")),
    responses(
        (status = 200, description = "Record deleted", body = DeleteResponse),
        (status = 403, description = "Not the owner", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Delete a check record.
///
/// # Errors
/// - 403 when the caller neither owns the record nor holds an elevated role.
/// - 404 when the record does not exist.
pub(crate) async fn delete_check(
    State(state): State<AppState>,
    Caller(claim): Caller,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    load_authorized(&state, &claim, Action::Delete, id).await?;
    let removed = state
        .store
        .delete_check(id)
        .await
        .map_err(|err| api_internal("failed to delete record", &err))?;
    if !removed {
        return Err(AuthzError::NotFound("record").into());
    }
    tracing::info!(caller = claim.id, record = id, "record deleted");
    Ok(Json(DeleteResponse { success: true }))
}
