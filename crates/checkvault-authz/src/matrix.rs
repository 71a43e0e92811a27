//! Static role/resource/action permission matrix.
//!
//! # Purpose
//! Answers "may this role perform this action on this resource" with a pure
//! lookup against a table fixed at process start.
//!
//! # How it fits
//! The [`AuthorizationGuard`](crate::AuthorizationGuard) consults the matrix
//! for `require_permission`, and handlers use it to decide whether a caller
//! sees every record (`checks:read_all`) or only their own. No other code
//! compares role names to grant access.
//!
//! # Key invariants
//! - The matrix is immutable once built; the built-in table is constructed
//!   once behind a `OnceLock`.
//! - Anything not granted is denied, including unknown names passed to
//!   [`PermissionMatrix::allows_raw`].
//!
//! # Examples
//! ```rust
//! use checkvault_authz::{Action, PermissionMatrix, Resource, Role};
//!
//! let matrix = PermissionMatrix::builtin();
//! assert!(matrix.has_permission(Role::Admin, Resource::System, Action::Manage));
//! assert!(!matrix.allows_raw("user", "checks", "approve"));
//! assert!(!matrix.allows_raw("auditor", "checks", "read"));
//! ```
use crate::{Action, Resource, Role};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

const BUILTIN_GRANTS: &[(Role, Resource, &[Action])] = &[
    (
        Role::Admin,
        Resource::Users,
        &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::List,
        ],
    ),
    (
        Role::Admin,
        Resource::Checks,
        &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::List,
            Action::ReadAll,
            Action::UpdateAll,
            Action::DeleteAll,
        ],
    ),
    (Role::Admin, Resource::System, &[Action::Manage]),
    (Role::BankStaff, Resource::Users, &[Action::Read, Action::List]),
    (
        Role::BankStaff,
        Resource::Checks,
        &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::List,
            Action::ReadAll,
            Action::UpdateAll,
            Action::Verify,
            Action::Approve,
        ],
    ),
    (
        Role::User,
        Resource::Checks,
        &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::List,
        ],
    ),
];

static BUILTIN: OnceLock<Arc<PermissionMatrix>> = OnceLock::new();

/// Immutable grant table keyed by `(role, resource)`.
///
/// # Invariants
/// - There is no mutating API; build a new matrix instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    grants: HashMap<(Role, Resource), BTreeSet<Action>>,
}

impl PermissionMatrix {
    /// Build a matrix from explicit grants.
    ///
    /// Repeated `(role, resource)` pairs are merged. Intended for loading a
    /// table from configuration at startup into the same shape as the
    /// built-in one.
    pub fn from_grants<I, A>(grants: I) -> Self
    where
        I: IntoIterator<Item = (Role, Resource, A)>,
        A: IntoIterator<Item = Action>,
    {
        let mut table: HashMap<(Role, Resource), BTreeSet<Action>> = HashMap::new();
        for (role, resource, actions) in grants {
            table.entry((role, resource)).or_default().extend(actions);
        }
        Self { grants: table }
    }

    /// The process-wide built-in table.
    pub fn builtin() -> Arc<PermissionMatrix> {
        BUILTIN
            .get_or_init(|| {
                Arc::new(Self::from_grants(BUILTIN_GRANTS.iter().map(
                    |(role, resource, actions)| (*role, *resource, actions.iter().copied()),
                )))
            })
            .clone()
    }

    pub fn has_permission(&self, role: Role, resource: Resource, action: Action) -> bool {
        self.grants
            .get(&(role, resource))
            .is_some_and(|actions| actions.contains(&action))
    }

    /// String-level lookup; any unknown role, resource or action is denied.
    pub fn allows_raw(&self, role: &str, resource: &str, action: &str) -> bool {
        let (Ok(role), Ok(resource), Ok(action)) = (
            role.parse::<Role>(),
            resource.parse::<Resource>(),
            action.parse::<Action>(),
        ) else {
            return false;
        };
        self.has_permission(role, resource, action)
    }

    /// Granted actions for a role on a resource, in declaration order.
    pub fn actions_for(&self, role: Role, resource: Resource) -> Vec<Action> {
        self.grants
            .get(&(role, resource))
            .map(|actions| actions.iter().copied().collect())
            .unwrap_or_default()
    }

    /// `resource:action` strings granted to a role, sorted.
    pub fn grants_for(&self, role: Role) -> Vec<String> {
        let mut granted: Vec<String> = Resource::ALL
            .into_iter()
            .flat_map(|resource| {
                self.actions_for(role, resource)
                    .into_iter()
                    .map(move |action| format!("{resource}:{action}"))
            })
            .collect();
        granted.sort();
        granted
    }
}

/// Look up a permission in the built-in table.
pub fn has_permission(role: Role, resource: Resource, action: Action) -> bool {
    PermissionMatrix::builtin().has_permission(role, resource, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    use Action::*;

    /// Written out independently of `BUILTIN_GRANTS`.
    const EXPECTED: &[(Role, Resource, &[Action])] = &[
        (Role::Admin, Resource::Users, &[Create, Read, Update, Delete, List]),
        (
            Role::Admin,
            Resource::Checks,
            &[Create, Read, Update, Delete, List, ReadAll, UpdateAll, DeleteAll],
        ),
        (Role::Admin, Resource::System, &[Manage]),
        (Role::BankStaff, Resource::Users, &[Read, List]),
        (
            Role::BankStaff,
            Resource::Checks,
            &[Create, Read, Update, Delete, List, ReadAll, UpdateAll, Verify, Approve],
        ),
        (Role::BankStaff, Resource::System, &[]),
        (Role::User, Resource::Users, &[]),
        (Role::User, Resource::Checks, &[Create, Read, Update, Delete, List]),
        (Role::User, Resource::System, &[]),
    ];

    fn expected(role: Role, resource: Resource) -> &'static [Action] {
        EXPECTED
            .iter()
            .find(|(r, res, _)| *r == role && *res == resource)
            .map(|(_, _, actions)| *actions)
            .expect("every role/resource pair is listed")
    }

    #[test]
    fn every_combination_matches_table() {
        assert_eq!(EXPECTED.len(), Role::ALL.len() * Resource::ALL.len());
        for role in Role::ALL {
            for resource in Resource::ALL {
                let expected = expected(role, resource);
                for action in Action::ALL {
                    assert_eq!(
                        has_permission(role, resource, action),
                        expected.contains(&action),
                        "{role} {resource} {action}"
                    );
                }
            }
        }
    }

    #[test]
    fn spot_checks() {
        assert!(has_permission(Role::Admin, Resource::Checks, Action::DeleteAll));
        assert!(!has_permission(Role::BankStaff, Resource::Checks, Action::DeleteAll));
        assert!(has_permission(Role::BankStaff, Resource::Checks, Action::Verify));
        assert!(!has_permission(Role::Admin, Resource::Checks, Action::Verify));
        assert!(!has_permission(Role::User, Resource::Users, Action::Read));
        assert!(!has_permission(Role::User, Resource::System, Action::Manage));
        assert!(!has_permission(Role::BankStaff, Resource::Users, Action::Update));
    }

    #[test]
    fn raw_lookup_denies_unknown_names() {
        let matrix = PermissionMatrix::builtin();
        assert!(matrix.allows_raw("admin", "users", "delete"));
        assert!(!matrix.allows_raw("root", "users", "delete"));
        assert!(!matrix.allows_raw("admin", "accounts", "delete"));
        assert!(!matrix.allows_raw("admin", "users", "purge"));
        assert!(!matrix.allows_raw("", "", ""));
    }

    #[test]
    fn builtin_is_shared() {
        let a = PermissionMatrix::builtin();
        let b = PermissionMatrix::builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn from_grants_merges_duplicates() {
        let matrix = PermissionMatrix::from_grants(vec![
            (Role::User, Resource::Checks, vec![Action::Read]),
            (Role::User, Resource::Checks, vec![Action::List]),
        ]);
        assert_eq!(
            matrix.actions_for(Role::User, Resource::Checks),
            vec![Action::Read, Action::List]
        );
        assert!(!matrix.has_permission(Role::Admin, Resource::Checks, Action::Read));
    }

    #[test]
    fn grants_for_renders_pairs() {
        let grants = PermissionMatrix::builtin().grants_for(Role::BankStaff);
        assert!(grants.contains(&"checks:approve".to_string()));
        assert!(grants.contains(&"users:list".to_string()));
        assert!(!grants.iter().any(|grant| grant.starts_with("system:")));
    }
}
