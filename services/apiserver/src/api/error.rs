//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction to keep error shapes uniform
//! across Checkvault endpoints.
//!
//! # Where it fits
//! All API handlers use these helpers to return structured errors to clients
//! and to translate store and authorization failures into HTTP responses.
//!
//! # Key invariants and assumptions
//! - Error responses include a stable `code` and a human-readable `error`.
//! - Status codes align with the error category.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
//! - Forbidden responses carry only the coarse deny reason, never the
//!   target's owner or role.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use checkvault_authz::AuthzError;

/// Structured API error returned by handlers.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
///
/// # Example
/// ```rust
/// use apiserver::api::error::ApiError;
/// use axum::http::StatusCode;
/// use checkvault_authz::AuthzError;
///
/// let err = ApiError::from(AuthzError::NotFound("record"));
/// assert_eq!(err.status, StatusCode::NOT_FOUND);
/// assert_eq!(err.body.code, "not_found");
/// assert_eq!(err.body.error, "record not found");
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.to_string(),
                code: code.to_string(),
                request_id: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match &err {
            AuthzError::Unauthenticated(message) => {
                ApiError::new(StatusCode::UNAUTHORIZED, err.code(), message)
            }
            AuthzError::Forbidden(reason) => {
                ApiError::new(StatusCode::FORBIDDEN, err.code(), reason.message())
            }
            AuthzError::AccountDisabled => {
                ApiError::new(StatusCode::FORBIDDEN, err.code(), "account disabled")
            }
            AuthzError::NotFound(what) => {
                ApiError::new(StatusCode::NOT_FOUND, err.code(), &format!("{what} not found"))
            }
            AuthzError::Internal(_) | AuthzError::InvalidSecret(_) => {
                tracing::error!(error = %err, "authorization failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.code(), "internal error")
            }
        }
    }
}

/// Build a 409 Conflict error with a caller-provided code.
pub fn api_conflict(code: &str, message: &str) -> ApiError {
    ApiError::new(StatusCode::CONFLICT, code, message)
}

/// Build a 500 Internal Server Error from a store error.
///
/// Logs the store error and returns the generic `message` to the client.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "checkvault storage error");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 500 Internal Server Error without a store error.
pub fn api_internal_message(message: &str) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 401 Unauthorized error.
pub fn api_unauthorized(message: &str) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
}

/// Build a 400 Bad Request validation error.
pub fn api_validation_error(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "validation_error", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkvault_authz::DenyReason;

    #[test]
    fn api_error_helpers_build_expected_codes() {
        let conflict = api_conflict("already_exists", "conflict");
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        assert_eq!(conflict.body.code, "already_exists");

        let internal = api_internal_message("oops");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.body.code, "internal");

        let unauthorized = api_unauthorized("nope");
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);

        let validation = api_validation_error("bad");
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.code, "validation_error");
    }

    #[test]
    fn api_internal_logs_and_wraps_store_error() {
        let err = StoreError::Unexpected(anyhow::anyhow!("boom"));
        let api = api_internal("storage failed", &err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.error, "storage failed");
    }

    #[test]
    fn authz_errors_map_to_status() {
        let cases = [
            (
                AuthzError::Unauthenticated("no credential supplied"),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AuthzError::Forbidden(DenyReason::NotOwner),
                StatusCode::FORBIDDEN,
            ),
            (AuthzError::AccountDisabled, StatusCode::FORBIDDEN),
            (AuthzError::NotFound("record"), StatusCode::NOT_FOUND),
            (
                AuthzError::Internal("lookup failed".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let code = err.code();
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.body.code, code);
        }
    }

    #[test]
    fn not_found_names_the_missing_kind() {
        let api = ApiError::from(AuthzError::NotFound("user"));
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.body.error, "user not found");
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let api = ApiError::from(AuthzError::Internal("db password wrong".to_string()));
        assert_eq!(api.body.error, "internal error");
    }

    #[test]
    fn forbidden_carries_coarse_reason() {
        let api = ApiError::from(AuthzError::Forbidden(DenyReason::RoleChange));
        assert_eq!(api.body.error, DenyReason::RoleChange.message());
        assert_eq!(api.body.code, "forbidden");
    }
}
