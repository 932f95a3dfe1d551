//! Auth configuration and shared auth state.

use anyhow::Result;
use std::time::Duration;

use crate::{hash::CredentialHasher, session::SessionStore};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Tunable knobs for the auth surface.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    session_ttl_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    // Secure cookies require an HTTPS frontend; plain http keeps them off
    // so local development works.
    pub(super) fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

/// Shared auth state carried in request extensions.
pub struct AuthState {
    config: AuthConfig,
    hasher: CredentialHasher,
    sessions: SessionStore,
    decoy_hash: String,
}

impl AuthState {
    /// Build the auth state, precomputing the decoy hash that login burns
    /// for unknown emails so their timing matches known ones.
    ///
    /// # Errors
    /// Returns an error if the decoy hash cannot be derived.
    pub fn new(config: AuthConfig, hasher: CredentialHasher) -> Result<Self> {
        let decoy_hash = hasher.hash("lulus-decoy-credential")?;
        let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_seconds()));
        Ok(Self {
            config,
            hasher,
            sessions,
            decoy_hash,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn hasher(&self) -> CredentialHasher {
        self.hasher
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub(super) fn decoy_hash(&self) -> &str {
        &self.decoy_hash
    }
}
