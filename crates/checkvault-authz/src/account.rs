//! Account-state gate.
//!
//! A token stays valid after its account is disabled or removed, so the
//! server re-reads the account on each guarded request when the gate is
//! enabled.
use crate::errors::ACCOUNT_NOT_FOUND;
use crate::{AuthzError, AuthzResult, IdentityClaim};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountStatus {
    pub id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("account lookup failed: {message}")]
pub struct LookupError {
    message: String,
}

impl LookupError {
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Read-only view of account state, implemented by the account store.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn account_status(&self, account_id: i64) -> Result<Option<AccountStatus>, LookupError>;
}

#[derive(Clone)]
pub struct AccountStateGate {
    accounts: Arc<dyn AccountLookup>,
}

impl std::fmt::Debug for AccountStateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStateGate").finish_non_exhaustive()
    }
}

impl AccountStateGate {
    pub fn new(accounts: Arc<dyn AccountLookup>) -> Self {
        Self { accounts }
    }

    /// Confirm the caller's account still exists and is active.
    pub async fn check(&self, claim: &IdentityClaim) -> AuthzResult<()> {
        let status = self
            .accounts
            .account_status(claim.id)
            .await
            .map_err(|err| {
                tracing::error!(caller = claim.id, error = %err, "account state lookup failed");
                AuthzError::Internal(err.to_string())
            })?;
        match status {
            None => Err(AuthzError::Unauthenticated(ACCOUNT_NOT_FOUND)),
            Some(status) if !status.is_active => Err(AuthzError::AccountDisabled),
            Some(_) => Ok(()),
        }
    }
}
