//! Rules for editing and removing accounts.
use crate::{Action, AuthorizationGuard, AuthzResult, DenyReason, IdentityClaim, Resource, Role};

/// Which kinds of fields an account update touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub sets_role: bool,
    pub sets_active_state: bool,
    /// Username, email, full name or password.
    pub sets_profile: bool,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        !(self.sets_role || self.sets_active_state || self.sets_profile)
    }
}

impl AuthorizationGuard {
    /// Decide whether `claim` may apply `changes` to account `target_id`.
    ///
    /// Only admins change roles or active state, including their own. Anyone
    /// may edit their own profile; editing someone else's needs
    /// `users:update`.
    pub fn check_account_update(
        &self,
        claim: &IdentityClaim,
        target_id: i64,
        changes: &AccountChanges,
    ) -> AuthzResult<()> {
        let is_admin = claim.role == Role::Admin;
        if changes.sets_role && !is_admin {
            tracing::debug!(caller = claim.id, target = target_id, "role change refused");
            return Err(DenyReason::RoleChange.into());
        }
        if changes.sets_active_state && !is_admin {
            tracing::debug!(caller = claim.id, target = target_id, "active state change refused");
            return Err(DenyReason::AccountStateChange.into());
        }
        if claim.id == target_id {
            return Ok(());
        }
        self.require_permission(claim, Resource::Users, Action::Update)
    }

    pub fn check_account_delete(&self, claim: &IdentityClaim, target_id: i64) -> AuthzResult<()> {
        self.require_role(claim, &[Role::Admin])?;
        self.require_permission(claim, Resource::Users, Action::Delete)?;
        if claim.id == target_id {
            return Err(DenyReason::SelfDelete.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthzError;

    const ROLE_ONLY: AccountChanges = AccountChanges {
        sets_role: true,
        sets_active_state: false,
        sets_profile: false,
    };
    const PROFILE_ONLY: AccountChanges = AccountChanges {
        sets_role: false,
        sets_active_state: false,
        sets_profile: true,
    };
    const ACTIVE_ONLY: AccountChanges = AccountChanges {
        sets_role: false,
        sets_active_state: true,
        sets_profile: false,
    };

    fn forbidden(reason: DenyReason) -> AuthzResult<()> {
        Err(AuthzError::Forbidden(reason))
    }

    #[test]
    fn user_cannot_promote_self() {
        let guard = AuthorizationGuard::default();
        let claim = IdentityClaim::new(7, "alice", Role::User);
        assert_eq!(
            guard.check_account_update(&claim, 7, &ROLE_ONLY),
            forbidden(DenyReason::RoleChange)
        );
    }

    #[test]
    fn bank_staff_cannot_change_roles() {
        let guard = AuthorizationGuard::default();
        let claim = IdentityClaim::new(2, "teller", Role::BankStaff);
        for target in [2, 7] {
            assert_eq!(
                guard.check_account_update(&claim, target, &ROLE_ONLY),
                forbidden(DenyReason::RoleChange)
            );
        }
    }

    #[test]
    fn only_admin_toggles_active_state() {
        let guard = AuthorizationGuard::default();
        let user = IdentityClaim::new(7, "alice", Role::User);
        assert_eq!(
            guard.check_account_update(&user, 7, &ACTIVE_ONLY),
            forbidden(DenyReason::AccountStateChange)
        );
        let admin = IdentityClaim::new(1, "root", Role::Admin);
        assert!(guard.check_account_update(&admin, 7, &ACTIVE_ONLY).is_ok());
    }

    #[test]
    fn profile_edits_follow_ownership() {
        let guard = AuthorizationGuard::default();
        let user = IdentityClaim::new(7, "alice", Role::User);
        assert!(guard.check_account_update(&user, 7, &PROFILE_ONLY).is_ok());
        assert_eq!(
            guard.check_account_update(&user, 8, &PROFILE_ONLY),
            forbidden(DenyReason::PermissionDenied)
        );

        let staff = IdentityClaim::new(2, "teller", Role::BankStaff);
        assert!(guard.check_account_update(&staff, 2, &PROFILE_ONLY).is_ok());
        assert!(guard.check_account_update(&staff, 7, &PROFILE_ONLY).is_err());
    }

    #[test]
    fn admin_may_change_anything() {
        let guard = AuthorizationGuard::default();
        let admin = IdentityClaim::new(1, "root", Role::Admin);
        let everything = AccountChanges {
            sets_role: true,
            sets_active_state: true,
            sets_profile: true,
        };
        assert!(guard.check_account_update(&admin, 7, &everything).is_ok());
        assert!(guard.check_account_update(&admin, 1, &everything).is_ok());
    }

    #[test]
    fn delete_rules() {
        let guard = AuthorizationGuard::default();
        let admin = IdentityClaim::new(1, "root", Role::Admin);
        assert!(guard.check_account_delete(&admin, 7).is_ok());
        assert_eq!(
            guard.check_account_delete(&admin, 1),
            forbidden(DenyReason::SelfDelete)
        );
        let staff = IdentityClaim::new(2, "teller", Role::BankStaff);
        assert_eq!(
            guard.check_account_delete(&staff, 7),
            forbidden(DenyReason::RoleNotPermitted)
        );
    }

    #[test]
    fn empty_changes() {
        assert!(AccountChanges::default().is_empty());
        assert!(!PROFILE_ONLY.is_empty());
    }
}
