//! Registration, login and identity endpoints.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_internal_message, api_unauthorized,
};
use crate::api::require_credentials;
use crate::api::types::{AuthResponse, LoginRequest, MeResponse, RegisterRequest, UserProfile};
use crate::app::AppState;
use crate::auth::Caller;
use crate::auth::password::{hash_password, verify_login};
use crate::model::{Account, NewAccount};
use crate::observability;
use crate::store::StoreError;
use axum::Json;
use axum::extract::State;
use checkvault_authz::{AuthzError, IdentityClaim, Role};
use chrono::Utc;

fn issue_token(state: &AppState, account: &Account) -> Result<String, ApiError> {
    let identity = IdentityClaim::new(account.id, account.username.clone(), account.role);
    state.issuer.sign(&identity).map_err(ApiError::from)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing username or password", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::api::types::ErrorResponse)
    )
)]
/// Self-service sign-up. New accounts always get the `user` role.
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (username, password) =
        require_credentials(body.username.as_deref(), body.password.as_deref())?;
    let password_hash = hash_password(password).map_err(|err| {
        tracing::error!(error = ?err, "failed to hash password");
        api_internal_message("failed to register")
    })?;
    let account = NewAccount {
        username: username.to_string(),
        password_hash,
        role: Role::User,
        full_name: body.full_name,
        email: body.email,
    };
    let account = match state.store.create_account(account).await {
        Ok(account) => account,
        Err(StoreError::Conflict(_)) => {
            return Err(api_conflict("already_exists", "username taken"));
        }
        Err(err) => return Err(api_internal("failed to register", &err)),
    };
    tracing::info!(account = account.id, "account registered");
    let token = issue_token(&state, &account)?;
    Ok(Json(AuthResponse {
        user: UserProfile::from(&account),
        token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credential issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Account disabled", body = crate::api::types::ErrorResponse)
    )
)]
/// Exchange a username and password for a signed credential.
///
/// # What it does
/// Verifies the password, against a placeholder hash when the username is
/// unknown, and refuses disabled accounts. A successful login stamps
/// `last_login` before the token is signed with the account's current role.
///
/// # Why it exists
/// The disabled check runs only after the password verifies, so the
/// response never reveals account state to someone without the password.
///
/// # Errors
/// - 400 when username or password is missing.
/// - 401 for an unknown username or a wrong password, with one message.
/// - 403 when the password matches but the account is disabled.
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (username, password) =
        require_credentials(body.username.as_deref(), body.password.as_deref())?;
    let account = state
        .store
        .find_account_by_username(username)
        .await
        .map_err(|err| api_internal("failed to log in", &err))?;
    let verified = verify_login(
        password,
        account.as_ref().map(|account| account.password_hash.as_str()),
    );
    let Some(mut account) = account.filter(|_| verified) else {
        observability::record_auth_failure("bad_password");
        return Err(api_unauthorized("invalid credentials"));
    };
    if !account.is_active {
        observability::record_auth_failure("account_disabled");
        return Err(AuthzError::AccountDisabled.into());
    }

    let now = Utc::now();
    state
        .store
        .record_login(account.id, now)
        .await
        .map_err(|err| api_internal("failed to log in", &err))?;
    account.last_login = Some(now);

    let token = issue_token(&state, &account)?;
    tracing::info!(account = account.id, role = %account.role, "login succeeded");
    Ok(Json(AuthResponse {
        user: UserProfile::from(&account),
        token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "auth",
    responses(
        (status = 200, description = "Verified caller identity", body = MeResponse),
        (status = 401, description = "Missing or invalid credential", body = crate::api::types::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn me(State(state): State<AppState>, Caller(claim): Caller) -> Json<MeResponse> {
    Json(MeResponse {
        permissions: state.guard.matrix().grants_for(claim.role),
        id: claim.id,
        username: claim.username,
        role: claim.role,
    })
}
