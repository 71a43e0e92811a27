//! Argon2id password hashing.
use anyhow::anyhow;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::OnceLock;

const DUMMY_PASSWORD: &str = "checkvault-unknown-account";

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static VERIFY_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("hash password: {err}"))
}

/// Constant-time check of `password` against a stored PHC string.
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    #[cfg(test)]
    VERIFY_CALLS.with(|calls| calls.set(calls.get() + 1));
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("stored password hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Verify a login attempt against the account's stored hash, if any.
///
/// An unknown username still pays for a full Argon2 verify against a fixed
/// hash, so response time does not reveal whether the account exists.
pub fn verify_login(password: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(stored) => verify_password(password, stored),
        None => {
            let _ = verify_password(password, dummy_hash());
            false
        }
    }
}

fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| {
        hash_password(DUMMY_PASSWORD).unwrap_or_else(|err| {
            tracing::error!(error = ?err, "failed to build placeholder password hash");
            String::new()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn salts_differ() {
        let a = hash_password("same").expect("hash");
        let b = hash_password("same").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("", ""));
    }

    fn verify_calls() -> usize {
        VERIFY_CALLS.with(|calls| calls.get())
    }

    #[test]
    fn unknown_account_still_runs_a_full_verify() {
        assert!(PasswordHash::new(dummy_hash()).is_ok());
        let before = verify_calls();
        assert!(!verify_login(DUMMY_PASSWORD, None));
        assert_eq!(verify_calls(), before + 1);
    }

    #[test]
    fn known_account_verifies_against_stored_hash() {
        let hash = hash_password("pw-123456").expect("hash");
        let before = verify_calls();
        assert!(verify_login("pw-123456", Some(&hash)));
        assert!(!verify_login("other", Some(&hash)));
        assert_eq!(verify_calls(), before + 2);
    }
}
