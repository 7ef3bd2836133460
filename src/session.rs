// src/session.rs
//! Bearer-token session shared by the identity and directory clients

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

type ExpiredCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Owns the bearer token; clients hold it behind an `Arc`
pub struct Session {
    token: RwLock<Option<String>>,
    token_path: Option<PathBuf>,
    on_expired: Option<ExpiredCallback>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
            token_path: None,
            on_expired: None,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.store(Some(token.into()));
        session
    }

    /// Load a previously saved token; a missing file means signed out
    pub fn load(path: &Path) -> Result<Self> {
        let mut session = Self::new();
        session.token_path = Some(path.to_path_buf());

        if path.exists() {
            let token = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read token file: {}", path.display()))?;
            let token = token.trim();
            if !token.is_empty() {
                session.store(Some(token.to_string()));
            }
        }

        Ok(session)
    }

    /// Called once each time the token is torn down because the service rejected it
    pub fn on_session_expired<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_expired = Some(Arc::new(callback));
        self
    }

    /// Token to send as `Authorization: Bearer`; an expired JWT tears the session down
    pub fn bearer(&self) -> Option<String> {
        let token = self.read()?;

        match token_expiry(&token) {
            Some(exp) if exp <= Utc::now() => {
                info!("Stored token expired at {}", exp);
                self.expire();
                None
            }
            _ => Some(token),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }

    /// Replace the token after a successful login; persisting it is best effort
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if let Some(path) = &self.token_path {
            if let Err(e) = persist_token(path, &token) {
                warn!("Token kept in memory only: {:#}", e);
            }
        }
        self.store(Some(token));
    }

    /// Sign out without notifying listeners
    pub fn clear(&self) {
        self.store(None);
        self.remove_token_file();
    }

    /// Tear the session down after an auth failure and notify the listener
    pub fn expire(&self) {
        let had_token = self.read().is_some();
        self.clear();

        if had_token {
            warn!("Session expired, stored token cleared");
            if let Some(callback) = &self.on_expired {
                callback();
            }
        }
    }

    fn read(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    fn remove_token_file(&self) {
        if let Some(path) = &self.token_path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove token file {}: {}", path.display(), e);
                }
            }
        }
    }
}

fn persist_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, token)
        .with_context(|| format!("Failed to write token file: {}", path.display()))
}

/// `exp` claim of a JWT; opaque tokens have none. The signature is the service's business.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims
        .exp
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn jwt(exp: i64) -> String {
        #[derive(serde::Serialize)]
        struct Body {
            sub: String,
            exp: i64,
        }
        encode(
            &Header::default(),
            &Body {
                sub: "user-1".into(),
                exp,
            },
            &EncodingKey::from_secret(b"not-our-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_opaque_token_is_kept() {
        let session = Session::with_token("opaque-token");
        assert_eq!(session.bearer().as_deref(), Some("opaque-token"));
        assert_eq!(token_expiry("opaque-token"), None);
    }

    #[test]
    fn test_reads_exp_claim() {
        let exp = Utc::now().timestamp() + 3600;
        assert_eq!(token_expiry(&jwt(exp)).map(|d| d.timestamp()), Some(exp));
    }

    #[test]
    fn test_expired_jwt_tears_down_and_notifies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let session = Session::new().on_session_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        session.store(Some(jwt(Utc::now().timestamp() - 60)));

        assert_eq!(session.bearer(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Nothing left to tear down
        session.expire();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_token_file_lifecycle() {
        let dir = std::env::temp_dir().join(format!("jobboard-session-{}", std::process::id()));
        let path = dir.join("token");
        let _ = std::fs::remove_file(&path);

        let session = Session::load(&path).unwrap();
        assert!(!session.is_authenticated());

        session.set_token("abc123");
        assert_eq!(Session::load(&path).unwrap().bearer().as_deref(), Some("abc123"));

        session.expire();
        assert!(!path.exists());
        assert!(!Session::load(&path).unwrap().is_authenticated());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
