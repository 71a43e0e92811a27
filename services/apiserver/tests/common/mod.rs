#![allow(dead_code)]

use apiserver::app::{AppState, build_router};
use apiserver::auth::password::hash_password;
use apiserver::config::ServerConfig;
use apiserver::model::{Account, AccountUpdate, NewAccount};
use apiserver::store::{AccountStore, CheckvaultStore, memory::InMemoryStore};
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::routing::RouterIntoService;
use checkvault_authz::{IdentityClaim, Role};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret-integration-secret";
pub const PASSWORD: &str = "password123";

static FIXTURE_HASH: OnceLock<String> = OnceLock::new();

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn config(enforce_account_state: bool) -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".parse().expect("bind"),
        metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
        jwt_secret: SECRET.to_string(),
        jwt_issuer: "checkvault".to_string(),
        token_ttl: Duration::from_secs(600),
        token_leeway_secs: 5,
        enforce_account_state,
        seed_admin: None,
    }
}

pub struct TestApp {
    pub app: RouterIntoService<Body>,
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_account_gate(true)
    }

    pub fn with_account_gate(enforce: bool) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state_store: Arc<dyn CheckvaultStore> = store.clone();
        let state = AppState::from_config(state_store, &config(enforce)).expect("state");
        let app = build_router(state.clone()).into_service();
        Self { app, state, store }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.expect("response")
    }

    /// Insert an account directly, skipping the per-call password hash.
    pub async fn account(&self, username: &str, role: Role) -> Account {
        let password_hash = FIXTURE_HASH
            .get_or_init(|| hash_password(PASSWORD).expect("hash"))
            .clone();
        self.store
            .create_account(NewAccount {
                username: username.to_string(),
                password_hash,
                role,
                full_name: None,
                email: None,
            })
            .await
            .expect("create account")
    }

    pub async fn disable(&self, account: &Account) {
        self.store
            .update_account(
                account.id,
                AccountUpdate {
                    is_active: Some(false),
                    ..AccountUpdate::default()
                },
            )
            .await
            .expect("disable")
            .expect("present");
    }

    pub fn token(&self, account: &Account) -> String {
        self.state
            .issuer
            .sign(&IdentityClaim::new(
                account.id,
                account.username.clone(),
                account.role,
            ))
            .expect("sign")
    }
}
