//! Request-scoped authorization guard.
//!
//! # Purpose
//! Composes the verified [`IdentityClaim`] with the [`PermissionMatrix`] to
//! reach a decision before a handler touches the store.
//!
//! # How it fits
//! Handlers call [`AuthorizationGuard::require_authenticated`] and then one of
//! `require_role`, `require_permission` or `allow_owner_or_elevated`. The last
//! one may return [`Gate::NeedsOwnershipCheck`], which the handler completes
//! with [`Gate::complete`] once the target record is loaded.
//!
//! # Key invariants
//! - The guard holds no per-request state; the same claim and record always
//!   produce the same decision.
//! - A [`Gate`] only allows through [`Gate::complete`]; dropping a pending
//!   gate never counts as an allow.
//!
//! # Examples
//! ```rust
//! use checkvault_authz::{
//!     Action, AuthorizationGuard, IdentityClaim, OwnedRecord, Resource, Role,
//! };
//!
//! struct Check { owner: i64 }
//! impl OwnedRecord for Check {
//!     fn owner_id(&self) -> i64 { self.owner }
//! }
//!
//! let guard = AuthorizationGuard::default();
//! let claim = IdentityClaim::new(7, "alice", Role::User);
//! let gate = guard
//!     .pre_check(&claim, Resource::Checks, Action::Update, "user_id")
//!     .admit()
//!     .expect("user may update checks");
//! assert!(gate.complete(&Check { owner: 7 }).is_ok());
//! ```
use crate::errors::NOT_AUTHENTICATED;
use crate::{
    Action, AuthzError, AuthzResult, DenyReason, IdentityClaim, OwnedRecord, PermissionMatrix,
    Resource, Role, authorize_against_record,
};
use std::sync::Arc;

/// Stateless decision unit shared by every request.
#[derive(Debug, Clone)]
pub struct AuthorizationGuard {
    matrix: Arc<PermissionMatrix>,
}

impl Default for AuthorizationGuard {
    fn default() -> Self {
        Self::new(PermissionMatrix::builtin())
    }
}

impl AuthorizationGuard {
    pub fn new(matrix: Arc<PermissionMatrix>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    /// Fail with `Unauthenticated` unless a verified claim is attached.
    pub fn require_authenticated<'a>(
        &self,
        claim: Option<&'a IdentityClaim>,
    ) -> AuthzResult<&'a IdentityClaim> {
        claim.ok_or(AuthzError::Unauthenticated(NOT_AUTHENTICATED))
    }

    /// Coarse gate on role membership, applied ahead of finer checks.
    pub fn require_role(&self, claim: &IdentityClaim, allowed: &[Role]) -> AuthzResult<()> {
        if allowed.contains(&claim.role) {
            return Ok(());
        }
        tracing::debug!(
            caller = claim.id,
            role = %claim.role,
            "role not in allowed set"
        );
        Err(DenyReason::RoleNotPermitted.into())
    }

    pub fn require_permission(
        &self,
        claim: &IdentityClaim,
        resource: Resource,
        action: Action,
    ) -> AuthzResult<()> {
        if self.matrix.has_permission(claim.role, resource, action) {
            return Ok(());
        }
        tracing::debug!(
            caller = claim.id,
            role = %claim.role,
            %resource,
            %action,
            "permission not granted"
        );
        Err(DenyReason::PermissionDenied.into())
    }

    /// Whether the caller may see every record of a resource rather than
    /// only their own.
    pub fn can_read_all(&self, claim: &IdentityClaim, resource: Resource) -> bool {
        self.matrix
            .has_permission(claim.role, resource, Action::ReadAll)
    }

    /// Allow elevated callers outright; defer everyone else to the record.
    ///
    /// `owner_field` names the record field holding the owner id and is only
    /// used for diagnostics.
    pub fn allow_owner_or_elevated(
        &self,
        claim: &IdentityClaim,
        owner_field: &'static str,
    ) -> Gate {
        if claim.role.is_elevated() {
            return Gate::Allowed;
        }
        Gate::NeedsOwnershipCheck(OwnershipCheck {
            claim: claim.clone(),
            owner_field,
        })
    }

    /// `require_permission` followed by `allow_owner_or_elevated`, folded
    /// into one gate.
    pub fn pre_check(
        &self,
        claim: &IdentityClaim,
        resource: Resource,
        action: Action,
        owner_field: &'static str,
    ) -> Gate {
        match self.require_permission(claim, resource, action) {
            Ok(()) => self.allow_owner_or_elevated(claim, owner_field),
            Err(AuthzError::Forbidden(reason)) => Gate::Denied(reason),
            Err(_) => Gate::Denied(DenyReason::PermissionDenied),
        }
    }
}

/// Outcome of a pre-check that may depend on the target record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a gate must be completed against the loaded record"]
pub enum Gate {
    Allowed,
    Denied(DenyReason),
    NeedsOwnershipCheck(OwnershipCheck),
}

impl Gate {
    /// Reject a denied gate before any record lookup happens.
    pub fn admit(self) -> AuthzResult<Self> {
        match self {
            Gate::Denied(reason) => Err(AuthzError::Forbidden(reason)),
            other => Ok(other),
        }
    }

    /// Final decision once the record is known to exist.
    pub fn complete<R: OwnedRecord + ?Sized>(self, record: &R) -> AuthzResult<()> {
        match self {
            Gate::Allowed => Ok(()),
            Gate::Denied(reason) => Err(AuthzError::Forbidden(reason)),
            Gate::NeedsOwnershipCheck(check) => check.resolve(record),
        }
    }
}

/// Pending ownership decision for a non-elevated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipCheck {
    claim: IdentityClaim,
    owner_field: &'static str,
}

impl OwnershipCheck {
    pub fn owner_field(&self) -> &'static str {
        self.owner_field
    }

    pub fn resolve<R: OwnedRecord + ?Sized>(&self, record: &R) -> AuthzResult<()> {
        let decision = authorize_against_record(&self.claim, record);
        if !decision.is_allowed() {
            tracing::debug!(
                caller = self.claim.id,
                owner_field = self.owner_field,
                "ownership check failed"
            );
        }
        decision.into_result()
    }
}
