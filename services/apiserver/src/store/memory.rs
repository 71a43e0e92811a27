//! In-memory implementation of the Checkvault store.
//!
//! # Purpose
//! Holds accounts and check records in `BTreeMap`s guarded by
//! `tokio::sync::RwLock`. Used for local development, tests, and any
//! deployment that does not need durability.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: mutations take a write lock, so id
//!   assignment and uniqueness checks are atomic with the insert.
//!
//! # Metrics
//! Gauges for account and check totals are refreshed after each mutation.
use super::{AccountStore, CheckStore, CheckvaultStore, StoreError, StoreResult};
use crate::model::{
    Account, AccountUpdate, CheckRecord, CheckUpdate, NewAccount, NewCheck, UserStats,
};
use crate::observability::{ACCOUNTS_TOTAL, CHECKS_TOTAL};
use async_trait::async_trait;
use checkvault_authz::Role;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Rows keyed by a process-assigned, strictly increasing id.
#[derive(Debug)]
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Clone)]
pub struct InMemoryStore {
    accounts: Arc<RwLock<Table<Account>>>,
    checks: Arc<RwLock<Table<CheckRecord>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(Table::new())),
            checks: Arc::new(RwLock::new(Table::new())),
        }
    }
}

fn email_taken(table: &Table<Account>, email: &str, except: Option<i64>) -> bool {
    table
        .rows
        .values()
        .any(|account| Some(account.id) != except && account.email.as_deref() == Some(email))
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut table = self.accounts.write().await;
        if table
            .rows
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(StoreError::Conflict(format!(
                "username {} already exists",
                account.username
            )));
        }
        if let Some(email) = account.email.as_deref() {
            if email_taken(&table, email, None) {
                return Err(StoreError::Conflict("email already exists".to_string()));
            }
        }
        let id = table.allocate_id();
        let created = Account {
            id,
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            full_name: account.full_name,
            email: account.email,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };
        table.rows.insert(id, created.clone());
        metrics::gauge!(ACCOUNTS_TOTAL).set(table.rows.len() as f64);
        Ok(created)
    }

    async fn get_account(&self, id: i64) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().await.rows.get(&id).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .rows
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .rows
            .values()
            .rev()
            .cloned()
            .collect())
    }

    async fn update_account(
        &self,
        id: i64,
        update: AccountUpdate,
    ) -> StoreResult<Option<Account>> {
        let mut table = self.accounts.write().await;
        if let Some(email) = update.email.as_deref() {
            if email_taken(&table, email, Some(id)) {
                return Err(StoreError::Conflict("email already exists".to_string()));
            }
        }
        let Some(account) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(full_name) = update.full_name {
            account.full_name = Some(full_name);
        }
        if let Some(email) = update.email {
            account.email = Some(email);
        }
        if let Some(role) = update.role {
            account.role = role;
        }
        if let Some(is_active) = update.is_active {
            account.is_active = is_active;
        }
        if let Some(password_hash) = update.password_hash {
            account.password_hash = password_hash;
        }
        Ok(Some(account.clone()))
    }

    async fn delete_account(&self, id: i64) -> StoreResult<bool> {
        let mut accounts = self.accounts.write().await;
        if accounts.rows.remove(&id).is_none() {
            return Ok(false);
        }
        metrics::gauge!(ACCOUNTS_TOTAL).set(accounts.rows.len() as f64);
        // Cascade to owned checks while the account lock is still held.
        let mut checks = self.checks.write().await;
        checks.rows.retain(|_, check| check.user_id != id);
        metrics::gauge!(CHECKS_TOTAL).set(checks.rows.len() as f64);
        Ok(true)
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> StoreResult<()> {
        let mut table = self.accounts.write().await;
        let account = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        account.last_login = Some(at);
        Ok(())
    }

    async fn account_stats(&self, now: DateTime<Utc>) -> StoreResult<UserStats> {
        let table = self.accounts.read().await;
        let week_ago = now - Duration::days(7);
        let mut stats = UserStats::default();
        for account in table.rows.values() {
            stats.total_users += 1;
            match account.role {
                Role::Admin => stats.admin_count += 1,
                Role::BankStaff => stats.bank_staff_count += 1,
                Role::User => stats.user_count += 1,
            }
            if account.is_active {
                stats.active_users += 1;
            } else {
                stats.inactive_users += 1;
            }
            if account.last_login.is_some_and(|at| at > week_ago) {
                stats.active_last_week += 1;
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl CheckStore for InMemoryStore {
    async fn create_check(&self, check: NewCheck) -> StoreResult<CheckRecord> {
        let mut table = self.checks.write().await;
        let id = table.allocate_id();
        let record = CheckRecord {
            id,
            user_id: check.user_id,
            content: check.content,
            meta: check.meta,
            created_at: Utc::now(),
            updated_at: None,
        };
        table.rows.insert(id, record.clone());
        metrics::gauge!(CHECKS_TOTAL).set(table.rows.len() as f64);
        Ok(record)
    }

    async fn get_check(&self, id: i64) -> StoreResult<Option<CheckRecord>> {
        Ok(self.checks.read().await.rows.get(&id).cloned())
    }

    async fn list_checks(&self) -> StoreResult<Vec<CheckRecord>> {
        Ok(self
            .checks
            .read()
            .await
            .rows
            .values()
            .rev()
            .cloned()
            .collect())
    }

    async fn list_checks_for_owner(&self, owner_id: i64) -> StoreResult<Vec<CheckRecord>> {
        Ok(self
            .checks
            .read()
            .await
            .rows
            .values()
            .rev()
            .filter(|check| check.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_check(
        &self,
        id: i64,
        update: CheckUpdate,
    ) -> StoreResult<Option<CheckRecord>> {
        let mut table = self.checks.write().await;
        let Some(record) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(content) = update.content {
            record.content = content;
        }
        if let Some(meta) = update.meta {
            record.meta = Some(meta);
        }
        record.updated_at = Some(Utc::now());
        Ok(Some(record.clone()))
    }

    async fn delete_check(&self, id: i64) -> StoreResult<bool> {
        let mut table = self.checks.write().await;
        let removed = table.rows.remove(&id).is_some();
        if removed {
            metrics::gauge!(CHECKS_TOTAL).set(table.rows.len() as f64);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CheckvaultStore for InMemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(username: &str, role: Role) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role,
            full_name: None,
            email: None,
        }
    }

    #[tokio::test]
    async fn account_lifecycle() {
        let store = InMemoryStore::new();
        let alice = store
            .create_account(new_account("alice", Role::User))
            .await
            .expect("create");
        assert_eq!(alice.id, 1);
        assert!(alice.is_active);

        let conflict = store.create_account(new_account("alice", Role::Admin)).await;
        assert!(matches!(conflict, Err(StoreError::Conflict(_))));

        let found = store
            .find_account_by_username("alice")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.id, alice.id);

        let updated = store
            .update_account(
                alice.id,
                AccountUpdate {
                    is_active: Some(false),
                    ..AccountUpdate::default()
                },
            )
            .await
            .expect("update")
            .expect("present");
        assert!(!updated.is_active);

        assert!(store.delete_account(alice.id).await.expect("delete"));
        assert!(!store.delete_account(alice.id).await.expect("delete again"));
        assert!(store.get_account(alice.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn email_must_be_unique() {
        let store = InMemoryStore::new();
        let mut first = new_account("a", Role::User);
        first.email = Some("shared@example.com".to_string());
        store.create_account(first).await.expect("create");
        let second = store
            .create_account(new_account("b", Role::User))
            .await
            .expect("create");
        let result = store
            .update_account(
                second.id,
                AccountUpdate {
                    email: Some("shared@example.com".to_string()),
                    ..AccountUpdate::default()
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_missing_account_is_none() {
        let store = InMemoryStore::new();
        let result = store
            .update_account(99, AccountUpdate::default())
            .await
            .expect("update");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn checks_are_listed_per_owner_newest_first() {
        let store = InMemoryStore::new();
        for (owner, content) in [(1, "a"), (2, "b"), (1, "c")] {
            store
                .create_check(NewCheck {
                    user_id: owner,
                    content: content.to_string(),
                    meta: None,
                })
                .await
                .expect("create");
        }
        let mine: Vec<_> = store
            .list_checks_for_owner(1)
            .await
            .expect("list")
            .into_iter()
            .map(|check| check.content)
            .collect();
        assert_eq!(mine, vec!["c".to_string(), "a".to_string()]);
        assert_eq!(store.list_checks().await.expect("all").len(), 3);
    }

    #[tokio::test]
    async fn deleting_account_removes_its_checks() {
        let store = InMemoryStore::new();
        let owner = store
            .create_account(new_account("owner", Role::User))
            .await
            .expect("create");
        let check = store
            .create_check(NewCheck {
                user_id: owner.id,
                content: "memo".to_string(),
                meta: None,
            })
            .await
            .expect("check");
        store.delete_account(owner.id).await.expect("delete");
        assert!(store.get_check(check.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn update_check_sets_timestamp() {
        let store = InMemoryStore::new();
        let check = store
            .create_check(NewCheck {
                user_id: 1,
                content: "before".to_string(),
                meta: None,
            })
            .await
            .expect("create");
        let updated = store
            .update_check(
                check.id,
                CheckUpdate {
                    content: Some("after".to_string()),
                    meta: None,
                },
            )
            .await
            .expect("update")
            .expect("present");
        assert_eq!(updated.content, "after");
        assert!(updated.updated_at.is_some());
        assert!(store.update_check(99, CheckUpdate::default()).await.expect("update").is_none());
    }

    #[tokio::test]
    async fn stats_count_roles_and_activity() {
        let store = InMemoryStore::new();
        let admin = store
            .create_account(new_account("root", Role::Admin))
            .await
            .expect("admin");
        store
            .create_account(new_account("teller", Role::BankStaff))
            .await
            .expect("staff");
        let user = store
            .create_account(new_account("alice", Role::User))
            .await
            .expect("user");
        store
            .update_account(
                user.id,
                AccountUpdate {
                    is_active: Some(false),
                    ..AccountUpdate::default()
                },
            )
            .await
            .expect("disable");
        let now = Utc::now();
        store.record_login(admin.id, now).await.expect("login");

        let stats = store.account_stats(now).await.expect("stats");
        assert_eq!(
            stats,
            UserStats {
                total_users: 3,
                admin_count: 1,
                bank_staff_count: 1,
                user_count: 1,
                active_users: 2,
                inactive_users: 1,
                active_last_week: 1,
            }
        );
        assert!(matches!(
            store.record_login(99, now).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
