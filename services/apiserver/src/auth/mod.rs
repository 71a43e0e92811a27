//! Request authentication.
//!
//! # Purpose
//! Verifies the bearer credential on protected routes, runs the account-state
//! gate, and exposes the resulting identity to handlers through [`Caller`].
//!
//! # Notes
//! The middleware is the only place a credential is read. Handlers never see
//! the raw header; they receive the verified claim or nothing.
pub mod password;

use crate::api::error::ApiError;
use crate::app::AppState;
use crate::observability;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use checkvault_authz::{ACCOUNT_NOT_FOUND, AuthzError, IdentityClaim, NO_CREDENTIAL};

/// Verify the credential and attach the claim to the request.
///
/// Rejections happen here, before any handler or store access for the
/// target resource.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let claim = match state.verifier.verify_header(header) {
        Ok(claim) => claim,
        Err(err) => {
            observability::record_auth_failure(failure_reason(&err));
            return ApiError::from(err).into_response();
        }
    };
    if let Some(gate) = &state.account_gate {
        if let Err(err) = gate.check(&claim).await {
            tracing::info!(caller = claim.id, code = err.code(), "account state gate rejected caller");
            observability::record_auth_failure(failure_reason(&err));
            return ApiError::from(err).into_response();
        }
    }
    tracing::Span::current().record("caller", claim.id);
    request.extensions_mut().insert(claim);
    next.run(request).await
}

fn failure_reason(err: &AuthzError) -> &'static str {
    match err {
        AuthzError::Unauthenticated(message) if *message == NO_CREDENTIAL => "missing_credential",
        AuthzError::Unauthenticated(message) if *message == ACCOUNT_NOT_FOUND => {
            "account_not_found"
        }
        AuthzError::Unauthenticated(_) => "invalid_credential",
        other => other.code(),
    }
}

/// The verified caller of the current request.
#[derive(Debug, Clone)]
pub struct Caller(pub IdentityClaim);

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claim = state
            .guard
            .require_authenticated(parts.extensions.get::<IdentityClaim>())?;
        Ok(Caller(claim.clone()))
    }
}
