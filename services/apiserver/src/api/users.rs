//! User administration handlers.
//!
//! # Purpose
//! Lists, reads, creates, edits and removes accounts. Role and active-state
//! changes go through the account mutation rule in `checkvault-authz`.
//!
//! # Security considerations
//! - Password hashes never leave the store; responses carry `UserProfile`.
//! - A non-elevated caller asking for someone else's profile is refused
//!   before the store is read, so the response does not reveal whether the
//!   account exists.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_internal_message, api_validation_error,
};
use crate::api::types::{
    CreateUserRequest, DeleteResponse, UpdateUserRequest, UserListResponse, UserProfile,
};
use crate::api::{authorize, parse_role, require_credentials};
use crate::app::AppState;
use crate::auth::Caller;
use crate::auth::password::hash_password;
use crate::model::{AccountUpdate, NewAccount, UserStats};
use crate::store::StoreError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkvault_authz::{AccountChanges, AuthzError, OwnedRecord, Role};
use chrono::Utc;

/// A profile addressed by id; each account owns its own profile.
struct ProfileRef(i64);

impl OwnedRecord for ProfileRef {
    fn owner_id(&self) -> i64 {
        self.0
    }
}

fn hash_or_internal(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|err| {
        tracing::error!(error = ?err, "failed to hash password");
        api_internal_message("failed to hash password")
    })
}

fn requested_changes(body: &UpdateUserRequest) -> AccountChanges {
    AccountChanges {
        sets_role: body.role.is_some(),
        sets_active_state: body.is_active.is_some(),
        sets_profile: body.full_name.is_some()
            || body.email.is_some()
            || body.password.as_deref().is_some_and(|password| !password.is_empty()),
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All accounts, newest first", body = UserListResponse),
        (status = 403, description = "Role not permitted", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    Caller(claim): Caller,
) -> Result<Json<UserListResponse>, ApiError> {
    authorize(
        state
            .guard
            .require_role(&claim, &[Role::Admin, Role::BankStaff]),
    )?;
    let accounts = state
        .store
        .list_accounts()
        .await
        .map_err(|err| api_internal("failed to list users", &err))?;
    Ok(Json(UserListResponse {
        items: accounts.iter().map(UserProfile::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/stats/summary",
    tag = "users",
    responses(
        (status = 200, description = "Account counts", body = UserStats),
        (status = 403, description = "Role not permitted", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Account counts for the admin dashboard.
///
/// # Errors
/// - 403 for any role other than admin.
pub(crate) async fn user_stats(
    State(state): State<AppState>,
    Caller(claim): Caller,
) -> Result<Json<UserStats>, ApiError> {
    authorize(state.guard.require_role(&claim, &[Role::Admin]))?;
    let stats = state
        .store
        .account_stats(Utc::now())
        .await
        .map_err(|err| api_internal("failed to fetch stats", &err))?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Account profile", body = UserProfile),
        (status = 403, description = "Not your profile", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Fetch one account profile.
///
/// # What it does
/// Decides owner-or-elevated against the path id, then loads the account.
///
/// # Why it exists
/// The profile's owner is the account itself, so the decision needs no
/// lookup; the store is only read once access is granted.
///
/// # Errors
/// - 403 when a non-elevated caller asks for another account.
/// - 404 when an elevated caller asks for an account that does not exist.
pub(crate) async fn get_user(
    State(state): State<AppState>,
    Caller(claim): Caller,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, ApiError> {
    authorize(
        state
            .guard
            .allow_owner_or_elevated(&claim, "id")
            .complete(&ProfileRef(id)),
    )?;
    let account = state
        .store
        .get_account(id)
        .await
        .map_err(|err| api_internal("failed to fetch user", &err))?
        .ok_or(AuthzError::NotFound("user"))?;
    Ok(Json(UserProfile::from(account)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Invalid payload", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Role not permitted", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Username or email taken", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Admin-only account creation with an explicit role.
///
/// # What it does
/// The role defaults to `user` and must be one of the known role names.
///
/// # Errors
/// - 400 when credentials are missing or the role is unknown.
/// - 403 for non-admin callers.
/// - 409 when the username or email is already taken.
pub(crate) async fn create_user(
    State(state): State<AppState>,
    Caller(claim): Caller,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    authorize(state.guard.require_role(&claim, &[Role::Admin]))?;
    let (username, password) =
        require_credentials(body.username.as_deref(), body.password.as_deref())?;
    let role = match body.role.as_deref() {
        Some(raw) => parse_role(raw)?,
        None => Role::User,
    };
    let account = NewAccount {
        username: username.to_string(),
        password_hash: hash_or_internal(password)?,
        role,
        full_name: body.full_name,
        email: body.email,
    };
    match state.store.create_account(account).await {
        Ok(account) => {
            tracing::info!(caller = claim.id, account = account.id, role = %account.role, "account created");
            Ok((StatusCode::CREATED, Json(UserProfile::from(account))))
        }
        Err(StoreError::Conflict(_)) => Err(api_conflict(
            "already_exists",
            "username or email already exists",
        )),
        Err(err) => Err(api_internal("failed to create user", &err)),
    }
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "Account identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Nothing to update or invalid role", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Change not permitted", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Email taken", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Apply a partial update to an account.
///
/// # What it does
/// Classifies the payload into profile, role and active-state changes and
/// runs the account mutation rule before parsing, hashing or touching the
/// store. Authorization looks only at which fields are present, so a
/// forbidden role change is refused even when the role name is also invalid.
///
/// # Why it exists
/// Role and active-state changes are admin-only even on one's own account;
/// this is the single entry point that can make them.
///
/// # Errors
/// - 403 when the caller may not make one of the requested changes.
/// - 400 when nothing would change or the role name is unknown.
/// - 404 when the account does not exist.
/// - 409 when the new email is already taken.
pub(crate) async fn update_user(
    State(state): State<AppState>,
    Caller(claim): Caller,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let changes = requested_changes(&body);
    authorize(state.guard.check_account_update(&claim, id, &changes))?;
    if changes.is_empty() {
        return Err(api_validation_error("no fields to update"));
    }

    let role = body.role.as_deref().map(parse_role).transpose()?;
    let password_hash = match body.password.as_deref().filter(|password| !password.is_empty()) {
        Some(password) => Some(hash_or_internal(password)?),
        None => None,
    };
    let update = AccountUpdate {
        full_name: body.full_name,
        email: body.email,
        role,
        is_active: body.is_active,
        password_hash,
    };
    match state.store.update_account(id, update).await {
        Ok(Some(account)) => {
            tracing::info!(caller = claim.id, account = id, "account updated");
            Ok(Json(UserProfile::from(account)))
        }
        Ok(None) => Err(AuthzError::NotFound("user").into()),
        Err(StoreError::Conflict(_)) => Err(api_conflict("already_exists", "email already exists")),
        Err(err) => Err(api_internal("failed to update user", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Account deleted", body = DeleteResponse),
        (status = 403, description = "Role not permitted or own account", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
/// Delete an account and its check records.
///
/// # Errors
/// - 403 for non-admin callers and for an admin targeting their own account.
/// - 404 when the account does not exist.
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    Caller(claim): Caller,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    authorize(state.guard.check_account_delete(&claim, id))?;
    let removed = state
        .store
        .delete_account(id)
        .await
        .map_err(|err| api_internal("failed to delete user", &err))?;
    if !removed {
        return Err(AuthzError::NotFound("user").into());
    }
    tracing::info!(caller = claim.id, account = id, "account deleted");
    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_is_not_a_change() {
        let body = UpdateUserRequest {
            password: Some(String::new()),
            ..UpdateUserRequest::default()
        };
        assert!(requested_changes(&body).is_empty());
    }

    #[test]
    fn role_and_state_are_classified() {
        let body = UpdateUserRequest {
            role: Some("admin".to_string()),
            is_active: Some(false),
            ..UpdateUserRequest::default()
        };
        let changes = requested_changes(&body);
        assert!(changes.sets_role);
        assert!(changes.sets_active_state);
        assert!(!changes.sets_profile);
    }
}
