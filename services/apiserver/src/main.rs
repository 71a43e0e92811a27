//! Checkvault API server entry point.
//!
//! # Purpose
//! Wires configuration, storage, credential handling and the HTTP router,
//! then serves the API alongside the Prometheus metrics listener.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
use apiserver::app::{AppState, build_router, seed_admin};
use apiserver::config::ServerConfig;
use apiserver::observability;
use apiserver::store::{CheckvaultStore, memory::InMemoryStore};
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env_or_yaml()?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("checkvault-apiserver")?;
    let state = build_state(&config).await?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state.clone());

    let addr = config.bind_addr;
    tracing::info!(
        %addr,
        backend = state.store.backend_name(),
        account_gate = state.account_gate.is_some(),
        "checkvault api server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn CheckvaultStore> = Arc::new(InMemoryStore::new());
    if let Some(seed) = &config.seed_admin {
        seed_admin(store.as_ref(), seed).await?;
    }
    AppState::from_config(store, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiserver::config::SeedAdmin;
    use serial_test::serial;
    use std::time::Duration;

    fn test_config(seed_admin: Option<SeedAdmin>) -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".parse().expect("bind"),
            metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            jwt_issuer: "checkvault".to_string(),
            token_ttl: Duration::from_secs(600),
            token_leeway_secs: 5,
            enforce_account_state: true,
            seed_admin,
        }
    }

    #[tokio::test]
    async fn build_state_seeds_admin_once() {
        let seed = SeedAdmin {
            username: "root".to_string(),
            password: "hunter22".to_string(),
        };
        let state = build_state(&test_config(Some(seed.clone())))
            .await
            .expect("state");
        let admin = state
            .store
            .find_account_by_username("root")
            .await
            .expect("lookup")
            .expect("seeded");
        assert_eq!(admin.role, checkvault_authz::Role::Admin);
        assert!(state.account_gate.is_some());

        seed_admin(state.store.as_ref(), &seed)
            .await
            .expect("second seed is a no-op");
        assert_eq!(state.store.list_accounts().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn build_state_rejects_short_secret() {
        let mut config = test_config(None);
        config.jwt_secret = "short".to_string();
        let err = build_state(&config).await.err().expect("short secret");
        assert!(err.to_string().contains("signing secret"));
    }

    #[tokio::test]
    #[serial]
    async fn run_with_shutdown_starts_and_stops() {
        run_with_shutdown(test_config(None), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
        })
        .await
        .expect("run should stop cleanly");
    }
}
