//! Checkvault HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and the shared helpers that turn
//! authorization outcomes into handler results.
pub mod auth;
pub mod error;
pub mod history;
pub mod openapi;
pub mod system;
pub mod types;
pub mod users;

use crate::api::error::{ApiError, api_validation_error};
use crate::observability;
use checkvault_authz::{AuthzResult, Role};

/// Final authorization step of a handler; counts the outcome either way.
pub(crate) fn authorize<T>(result: AuthzResult<T>) -> Result<T, ApiError> {
    match result {
        Ok(value) => {
            observability::record_authz_outcome("allowed");
            Ok(value)
        }
        Err(err) => Err(deny(err)),
    }
}

/// Intermediate authorization step; only a denial is counted.
pub(crate) fn precheck<T>(result: AuthzResult<T>) -> Result<T, ApiError> {
    result.map_err(deny)
}

fn deny(err: checkvault_authz::AuthzError) -> ApiError {
    observability::record_authz_outcome(err.code());
    ApiError::from(err)
}

/// Parse a role named in a request payload; unknown names are rejected.
pub(crate) fn parse_role(raw: &str) -> Result<Role, ApiError> {
    raw.parse::<Role>()
        .map_err(|_| api_validation_error("invalid role; must be admin, bank_staff or user"))
}

/// Username and password both present and non-empty.
pub(crate) fn require_credentials<'a>(
    username: Option<&'a str>,
    password: Option<&'a str>,
) -> Result<(&'a str, &'a str), ApiError> {
    match (username.map(str::trim), password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Ok((username, password))
        }
        _ => Err(api_validation_error("username and password required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use checkvault_authz::{AuthzError, DenyReason};

    #[test]
    fn role_names_are_strict() {
        assert_eq!(parse_role("bank_staff").expect("role"), Role::BankStaff);
        let err = parse_role("superuser").expect_err("unknown role");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn credentials_must_be_present() {
        assert!(require_credentials(Some("alice"), Some("pw")).is_ok());
        assert!(require_credentials(Some(" "), Some("pw")).is_err());
        assert!(require_credentials(Some("alice"), Some("")).is_err());
        assert!(require_credentials(None, Some("pw")).is_err());
    }

    #[test]
    fn denials_become_api_errors() {
        let err = authorize::<()>(Err(AuthzError::Forbidden(DenyReason::NotOwner)))
            .expect_err("denied");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(precheck(Ok::<_, AuthzError>(3)).expect("allowed"), 3);
    }
}
