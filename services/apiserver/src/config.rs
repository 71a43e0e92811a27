use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_ISSUER: &str = "checkvault";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_TOKEN_LEEWAY_SECS: u64 = 5;
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Bootstrap administrator created at startup when no account has its name.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SeedAdmin {
    fn parse(value: &str) -> Result<Self> {
        let Some((username, password)) = value.split_once(':') else {
            bail!("seed admin must be `username:password`");
        };
        if username.is_empty() || password.is_empty() {
            bail!("seed admin username and password must be non-empty");
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

// API server configuration sourced from environment variables.
#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl: Duration,
    pub token_leeway_secs: u64,
    pub enforce_account_state: bool,
    pub seed_admin: Option<SeedAdmin>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("metrics_bind", &self.metrics_bind)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_ttl", &self.token_ttl)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .field("enforce_account_state", &self.enforce_account_state)
            .field("seed_admin", &self.seed_admin)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ServerConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    jwt_secret: Option<String>,
    jwt_issuer: Option<String>,
    token_ttl_secs: Option<u64>,
    token_leeway_secs: Option<u64>,
    enforce_account_state: Option<bool>,
    seed_admin: Option<String>,
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("parse {name}: expected a boolean, got {other:?}"),
    }
}

impl ServerConfig {
    /// Load from the environment. The signing secret may still be missing
    /// here; `validate` enforces it once overrides have been applied.
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("CHECKVAULT_BIND")
            .unwrap_or_else(|_| "0.0.0.0:4000".to_string())
            .parse()
            .with_context(|| "parse CHECKVAULT_BIND")?;
        let metrics_bind = std::env::var("CHECKVAULT_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9464".to_string())
            .parse()
            .with_context(|| "parse CHECKVAULT_METRICS_BIND")?;
        let jwt_secret = std::env::var("CHECKVAULT_JWT_SECRET").unwrap_or_default();
        let jwt_issuer =
            std::env::var("CHECKVAULT_JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());
        let token_ttl_secs = match std::env::var("CHECKVAULT_TOKEN_TTL_SECS") {
            Ok(value) => value
                .parse()
                .with_context(|| "parse CHECKVAULT_TOKEN_TTL_SECS")?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };
        let token_leeway_secs = match std::env::var("CHECKVAULT_TOKEN_LEEWAY_SECS") {
            Ok(value) => value
                .parse()
                .with_context(|| "parse CHECKVAULT_TOKEN_LEEWAY_SECS")?,
            Err(_) => DEFAULT_TOKEN_LEEWAY_SECS,
        };
        let enforce_account_state = match std::env::var("CHECKVAULT_ENFORCE_ACCOUNT_STATE") {
            Ok(value) => parse_bool("CHECKVAULT_ENFORCE_ACCOUNT_STATE", &value)?,
            Err(_) => true,
        };
        let seed_admin = match std::env::var("CHECKVAULT_SEED_ADMIN") {
            Ok(value) => Some(SeedAdmin::parse(&value).with_context(|| "parse CHECKVAULT_SEED_ADMIN")?),
            Err(_) => None,
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            jwt_secret,
            jwt_issuer,
            token_ttl: Duration::from_secs(token_ttl_secs),
            token_leeway_secs,
            enforce_account_state,
            seed_admin,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("CHECKVAULT_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read CHECKVAULT_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: ServerConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse api server config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.jwt_secret {
            self.jwt_secret = value;
        }
        if let Some(value) = override_cfg.jwt_issuer {
            self.jwt_issuer = value;
        }
        if let Some(value) = override_cfg.token_ttl_secs {
            self.token_ttl = Duration::from_secs(value);
        }
        if let Some(value) = override_cfg.token_leeway_secs {
            self.token_leeway_secs = value;
        }
        if let Some(value) = override_cfg.enforce_account_state {
            self.enforce_account_state = value;
        }
        if let Some(value) = override_cfg.seed_admin {
            self.seed_admin = Some(SeedAdmin::parse(&value).with_context(|| "parse seed_admin")?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            bail!("CHECKVAULT_JWT_SECRET is required");
        }
        if self.jwt_secret.len() < 32 {
            bail!("CHECKVAULT_JWT_SECRET must be at least 32 bytes");
        }
        if self.token_ttl.is_zero() {
            bail!("token ttl must be positive");
        }
        if self.token_ttl.as_secs() > MAX_TOKEN_TTL_SECS {
            bail!("token ttl must not exceed {MAX_TOKEN_TTL_SECS} seconds");
        }
        Ok(())
    }
}
