//! Checkvault authn/authz primitives shared by the API server and its tooling.
//!
//! # Purpose
//! Centralizes credential verification, the static role/resource/action
//! permission matrix, ownership delegation, and the account-state gate used
//! to guard check records and user administration.
//!
//! # How it fits
//! The API server mints tokens at login and verifies them on every request,
//! then asks the [`AuthorizationGuard`] for a decision before touching the
//! record store. Decisions that depend on a record's owner are returned as a
//! pending [`Gate`] that the handler completes once the record is loaded.
//!
//! # Key invariants
//! - Tokens are HS256 only and carry `{id, username, role}`; other algorithms
//!   are rejected.
//! - The permission matrix is built once and never mutated; unknown
//!   combinations are denied.
//! - Absent or unrecognized roles resolve to [`Role::User`], never to an
//!   elevated role.
//! - Every check fails closed; store failures surface as
//!   [`AuthzError::Internal`], never as an allow.
//!
//! # Important configuration
//! - Issuer and verifier must be built from the same [`SharedSecret`] and
//!   issuer string.
//!
//! # Examples
//! ```rust
//! use checkvault_authz::{Action, Resource, Role, has_permission};
//!
//! assert!(has_permission(Role::BankStaff, Resource::Checks, Action::Approve));
//! assert!(!has_permission(Role::User, Resource::Users, Action::List));
//! ```
//!
//! # Common pitfalls
//! - Calling the ownership resolver before checking that the record exists
//!   conflates `NotFound` with `Forbidden`.
//! - Branching on role names in handlers instead of asking the matrix.

mod account;
mod action;
mod decision;
mod errors;
mod guard;
mod matrix;
mod mutation;
mod ownership;
mod resource;
mod role;
mod token;

pub use account::{AccountLookup, AccountStateGate, AccountStatus, LookupError};
pub use action::Action;
pub use decision::{Decision, DenyReason};
pub use errors::{
    ACCOUNT_NOT_FOUND, AuthzError, AuthzResult, INVALID_CREDENTIAL, NO_CREDENTIAL, NOT_AUTHENTICATED,
};
pub use guard::{AuthorizationGuard, Gate, OwnershipCheck};
pub use matrix::{PermissionMatrix, has_permission};
pub use mutation::AccountChanges;
pub use ownership::{OwnedRecord, authorize_against_record};
pub use resource::Resource;
pub use role::Role;
pub use token::{
    CredentialVerifier, IdentityClaim, SharedSecret, TokenClaims, TokenIssuer, extract_bearer,
};
