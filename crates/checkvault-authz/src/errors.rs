use crate::DenyReason;
use thiserror::Error;

pub const NO_CREDENTIAL: &str = "no credential supplied";
pub const INVALID_CREDENTIAL: &str = "invalid credential";
pub const NOT_AUTHENTICATED: &str = "not authenticated";
pub const ACCOUNT_NOT_FOUND: &str = "account not found";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(DenyReason),
    #[error("account disabled")]
    AccountDisabled,
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),
}

impl AuthzError {
    /// Stable, coarse error code used in responses and metric labels.
    pub fn code(&self) -> &'static str {
        match self {
            AuthzError::Unauthenticated(_) => "unauthenticated",
            AuthzError::Forbidden(_) => "forbidden",
            AuthzError::AccountDisabled => "account_disabled",
            AuthzError::NotFound(_) => "not_found",
            AuthzError::Internal(_) | AuthzError::InvalidSecret(_) => "internal",
        }
    }
}

impl From<DenyReason> for AuthzError {
    fn from(reason: DenyReason) -> Self {
        AuthzError::Forbidden(reason)
    }
}

pub type AuthzResult<T> = Result<T, AuthzError>;
