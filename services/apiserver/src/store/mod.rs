use crate::model::{
    Account, AccountUpdate, CheckRecord, CheckUpdate, NewAccount, NewCheck, UserStats,
};
use async_trait::async_trait;
use checkvault_authz::{AccountLookup, AccountStatus, LookupError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken.
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;
    async fn get_account(&self, id: i64) -> StoreResult<Option<Account>>;
    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>>;
    /// Newest first.
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;
    /// `Ok(None)` when the account does not exist.
    async fn update_account(&self, id: i64, update: AccountUpdate)
    -> StoreResult<Option<Account>>;
    /// Removes the account and every check it owns. `false` when absent.
    async fn delete_account(&self, id: i64) -> StoreResult<bool>;
    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> StoreResult<()>;
    async fn account_stats(&self, now: DateTime<Utc>) -> StoreResult<UserStats>;
}

#[async_trait]
pub trait CheckStore: Send + Sync {
    async fn create_check(&self, check: NewCheck) -> StoreResult<CheckRecord>;
    async fn get_check(&self, id: i64) -> StoreResult<Option<CheckRecord>>;
    /// Every record, newest first.
    async fn list_checks(&self) -> StoreResult<Vec<CheckRecord>>;
    async fn list_checks_for_owner(&self, owner_id: i64) -> StoreResult<Vec<CheckRecord>>;
    async fn update_check(&self, id: i64, update: CheckUpdate)
    -> StoreResult<Option<CheckRecord>>;
    async fn delete_check(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait CheckvaultStore: AccountStore + CheckStore {
    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}

/// Feeds the account-state gate from the account store.
pub struct StoreAccountLookup {
    store: Arc<dyn CheckvaultStore>,
}

impl StoreAccountLookup {
    pub fn new(store: Arc<dyn CheckvaultStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AccountLookup for StoreAccountLookup {
    async fn account_status(&self, account_id: i64) -> Result<Option<AccountStatus>, LookupError> {
        let account = self
            .store
            .get_account(account_id)
            .await
            .map_err(LookupError::new)?;
        Ok(account.map(|account| AccountStatus {
            id: account.id,
            is_active: account.is_active,
        }))
    }
}
