//! Typed authorization outcomes.
//!
//! # Purpose
//! Every check returns a value rather than signalling through control flow,
//! so a forgotten branch can never read as an implicit allow.
use crate::{AuthzError, AuthzResult};
use serde::Serialize;

/// Why an authenticated caller was refused.
///
/// Only the coarse message leaves the process; it never names other
/// accounts or their roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    RoleNotPermitted,
    PermissionDenied,
    NotOwner,
    RoleChange,
    AccountStateChange,
    SelfDelete,
}

impl DenyReason {
    pub fn message(self) -> &'static str {
        match self {
            DenyReason::RoleNotPermitted => "role not permitted",
            DenyReason::PermissionDenied => "permission denied",
            DenyReason::NotOwner => "not authorized for this resource",
            DenyReason::RoleChange => "cannot change user roles",
            DenyReason::AccountStateChange => "cannot change account active status",
            DenyReason::SelfDelete => "cannot delete your own account",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Final allow/deny outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn into_result(self) -> AuthzResult<()> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied(reason) => Err(AuthzError::Forbidden(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_maps_to_forbidden() {
        assert_eq!(Decision::Allowed.into_result(), Ok(()));
        assert_eq!(
            Decision::Denied(DenyReason::NotOwner).into_result(),
            Err(AuthzError::Forbidden(DenyReason::NotOwner))
        );
        assert!(!Decision::Denied(DenyReason::PermissionDenied).is_allowed());
    }

    #[test]
    fn messages_are_non_empty() {
        for reason in [
            DenyReason::RoleNotPermitted,
            DenyReason::PermissionDenied,
            DenyReason::NotOwner,
            DenyReason::RoleChange,
            DenyReason::AccountStateChange,
            DenyReason::SelfDelete,
        ] {
            assert!(!reason.to_string().is_empty());
        }
    }
}
