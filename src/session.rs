//! In-memory session store for administrator logins.
//!
//! Tokens are 32 random bytes, URL-safe base64 on the wire. The map never
//! holds raw tokens; keys are SHA-256 digests of the token, so presenting a
//! cookie always goes through the same hash step.

use anyhow::{Context, Result};
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

struct SessionEntry {
    principal_id: Uuid,
    created_at: Instant,
}

/// Process-wide session state mapping opaque tokens to principals.
///
/// Entries expire a fixed interval after creation. Expired entries are
/// swept lazily on access; no background task is required.
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<Vec<u8>, SessionEntry>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session for a principal and return the raw token.
    ///
    /// The raw value is only returned to set the cookie; the store keeps a
    /// hash.
    ///
    /// # Errors
    /// Returns an error if the entropy source fails.
    pub async fn create(&self, principal_id: Uuid) -> Result<String> {
        let token = generate_session_token()?;
        let key = hash_session_token(&token);
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        sessions.insert(
            key,
            SessionEntry {
                principal_id,
                created_at: Instant::now(),
            },
        );
        Ok(token)
    }

    /// Resolve a raw token to its principal, evicting expired entries.
    pub async fn lookup(&self, token: &str) -> Option<Uuid> {
        let key = hash_session_token(token);
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        sessions.get(&key).map(|entry| entry.principal_id)
    }

    /// Drop a session. Invalidating an unknown token is a no-op.
    pub async fn invalidate(&self, token: &str) {
        let key = hash_session_token(token);
        self.sessions.lock().await.remove(&key);
    }
}

/// Mint the random value that backs a session cookie.
fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never sit in the map.
fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[tokio::test]
    async fn create_then_lookup_round_trip() {
        let store = SessionStore::new(Duration::from_secs(60));
        let principal_id = Uuid::new_v4();
        let token = store.create(principal_id).await.unwrap();
        assert_eq!(store.lookup(&token).await, Some(principal_id));
    }

    #[tokio::test]
    async fn tokens_are_opaque_and_distinct() {
        let store = SessionStore::new(Duration::from_secs(60));
        let principal_id = Uuid::new_v4();
        let first = store.create(principal_id).await.unwrap();
        let second = store.create(principal_id).await.unwrap();
        assert_ne!(first, second);

        let decoded = URL_SAFE_NO_PAD.decode(first.as_bytes()).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[tokio::test]
    async fn unknown_token_is_absent() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert_eq!(store.lookup("not-a-token").await, None);
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(Uuid::new_v4()).await.unwrap();
        store.invalidate(&token).await;
        assert_eq!(store.lookup(&token).await, None);
        // Second invalidation of the same token is a no-op.
        store.invalidate(&token).await;
        store.invalidate("never-existed").await;
    }

    #[tokio::test]
    async fn expired_sessions_are_evicted_on_lookup() {
        let store = SessionStore::new(Duration::from_millis(10));
        let token = store.create(Uuid::new_v4()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.lookup(&token).await, None);
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let store = SessionStore::new(Duration::ZERO);
        let token = store.create(Uuid::new_v4()).await.unwrap();
        assert_eq!(store.lookup(&token).await, None);
    }
}
