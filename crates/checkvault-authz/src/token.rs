use crate::errors::{INVALID_CREDENTIAL, NO_CREDENTIAL};
use crate::role::deserialize_claim_role;
use crate::{AuthzError, AuthzResult, Role};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MIN_SECRET_LEN: usize = 32;

/// Decoded, trusted caller identity for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl IdentityClaim {
    pub fn new(id: i64, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub id: i64,
    pub username: String,
    #[serde(default, deserialize_with = "deserialize_claim_role")]
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl From<TokenClaims> for IdentityClaim {
    fn from(claims: TokenClaims) -> Self {
        IdentityClaim {
            id: claims.id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// HMAC secret shared by the issuer and the verifier.
#[derive(Clone)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> AuthzResult<Self> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(AuthzError::InvalidSecret(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    ttl: Duration,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(issuer: impl Into<String>, ttl: Duration, secret: &SharedSecret) -> Self {
        Self {
            issuer: issuer.into(),
            ttl,
            encoding_key: EncodingKey::from_secret(&secret.0),
        }
    }

    pub fn sign(&self, identity: &IdentityClaim) -> AuthzResult<String> {
        let now = now_epoch_seconds();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| AuthzError::Internal("credential lifetime out of range".to_string()))?;
        let claims = TokenClaims {
            iss: self.issuer.clone(),
            id: identity.id,
            username: identity.username.clone(),
            role: identity.role,
            iat: now,
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthzError::Internal(format!("sign credential: {err}")))
    }
}

#[derive(Clone)]
pub struct CredentialVerifier {
    validation: Validation,
    decoding_key: DecodingKey,
}

impl CredentialVerifier {
    pub fn new(issuer: impl Into<String>, leeway: u64, secret: &SharedSecret) -> Self {
        let issuer = issuer.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = leeway;
        Self {
            validation,
            decoding_key: DecodingKey::from_secret(&secret.0),
        }
    }

    /// Verify the raw `Authorization` header value.
    pub fn verify_header(&self, header: Option<&str>) -> AuthzResult<IdentityClaim> {
        let token = extract_bearer(header)?;
        self.verify(token)
    }

    pub fn verify(&self, token: &str) -> AuthzResult<IdentityClaim> {
        match jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.into()),
            Err(err) => {
                tracing::debug!(error = %err, "credential rejected");
                Err(AuthzError::Unauthenticated(INVALID_CREDENTIAL))
            }
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> AuthzResult<&str> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthzError::Unauthenticated(NO_CREDENTIAL))?;
    if token.is_empty() {
        return Err(AuthzError::Unauthenticated(NO_CREDENTIAL));
    }
    Ok(token)
}

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}
