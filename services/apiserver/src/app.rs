//! API server HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! Routes under `/api/me`, `/api/history` and `/api/users` sit behind the
//! authentication middleware; everything else is public.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::auth::password::hash_password;
use crate::config::{SeedAdmin, ServerConfig};
use crate::model::NewAccount;
use crate::observability;
use crate::store::{CheckvaultStore, StoreAccountLookup, StoreError};
use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use checkvault_authz::{
    AccountStateGate, AuthorizationGuard, CredentialVerifier, Role, SharedSecret, TokenIssuer,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CheckvaultStore>,
    pub verifier: CredentialVerifier,
    pub issuer: TokenIssuer,
    pub guard: AuthorizationGuard,
    /// `None` when account-state enforcement is switched off.
    pub account_gate: Option<AccountStateGate>,
}

impl AppState {
    pub fn from_config(
        store: Arc<dyn CheckvaultStore>,
        config: &ServerConfig,
    ) -> anyhow::Result<Self> {
        let secret =
            SharedSecret::new(config.jwt_secret.as_bytes()).context("build signing secret")?;
        let issuer = TokenIssuer::new(config.jwt_issuer.clone(), config.token_ttl, &secret);
        let verifier =
            CredentialVerifier::new(config.jwt_issuer.clone(), config.token_leeway_secs, &secret);
        let account_gate = config.enforce_account_state.then(|| {
            AccountStateGate::new(Arc::new(StoreAccountLookup::new(store.clone())))
        });
        Ok(Self {
            store,
            verifier,
            issuer,
            guard: AuthorizationGuard::default(),
            account_gate,
        })
    }
}

/// Create the bootstrap administrator unless the username already exists.
pub async fn seed_admin(store: &dyn CheckvaultStore, seed: &SeedAdmin) -> anyhow::Result<()> {
    let password_hash = hash_password(&seed.password)?;
    let account = NewAccount {
        username: seed.username.clone(),
        password_hash,
        role: Role::Admin,
        full_name: None,
        email: None,
    };
    match store.create_account(account).await {
        Ok(created) => {
            tracing::info!(account = created.id, username = %created.username, "seeded admin account");
            Ok(())
        }
        Err(StoreError::Conflict(_)) => {
            tracing::info!(username = %seed.username, "seed admin already present");
            Ok(())
        }
        Err(err) => Err(err).context("seed admin account"),
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                caller = tracing::field::Empty
            );
            span.set_parent(parent);
            span
        });

    let protected = Router::new()
        .route("/api/me", get(api::auth::me))
        .route(
            "/api/history",
            get(api::history::list_checks).post(api::history::create_check),
        )
        .route(
            "/api/history/:id",
            get(api::history::get_check)
                .put(api::history::update_check)
                .delete(api::history::delete_check),
        )
        .route(
            "/api/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/api/users/stats/summary",
            get(api::users::user_stats),
        )
        .route(
            "/api/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    Router::new()
        .route("/", get(api::system::banner))
        .route("/api/health", get(api::system::health))
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        .merge(protected)
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/api/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
