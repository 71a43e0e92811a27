//! Stored entities: accounts and check records.
use checkvault_authz::{OwnedRecord, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A login account as held by the store.
///
/// Carries the password hash, so it is never serialized into a response;
/// handlers convert it into `UserProfile` first.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl OwnedRecord for Account {
    /// An account profile is owned by the account itself.
    fn owner_id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Partial update of an account; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}

/// One scanned check and its extracted content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckRecord {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    #[schema(value_type = Object)]
    pub meta: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedRecord for CheckRecord {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewCheck {
    pub user_id: i64,
    pub content: String,
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckUpdate {
    pub content: Option<String>,
    pub meta: Option<serde_json::Value>,
}

impl CheckUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.meta.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserStats {
    pub total_users: u64,
    pub admin_count: u64,
    pub bank_staff_count: u64,
    pub user_count: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub active_last_week: u64,
}
