//! Password hashing for administrator credentials.
//!
//! Stored values are `<digest_hex>.<salt_hex>`: a 64-byte scrypt digest and
//! the 16-byte salt that produced it, both hex encoded and joined by a single
//! `.`. The hex form of the salt feeds the derivation, so stored values are
//! portable across processes and restarts.

use anyhow::{Context, Result, anyhow};
use rand::{RngCore, rngs::OsRng};
use scrypt::Params;
use subtle::ConstantTimeEq;

const DIGEST_LENGTH: usize = 64;
const SALT_LENGTH: usize = 16;

const DEFAULT_LOG_N: u8 = 14;
const DEFAULT_R: u32 = 8;
const DEFAULT_P: u32 = 1;

/// Salted scrypt hasher with injectable cost parameters.
#[derive(Clone, Copy, Debug)]
pub struct CredentialHasher {
    log_n: u8,
    r: u32,
    p: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            log_n: DEFAULT_LOG_N,
            r: DEFAULT_R,
            p: DEFAULT_P,
        }
    }

    /// Override the derivation cost. Tests use cheap parameters; production
    /// callers stay on the defaults.
    #[must_use]
    pub const fn with_params(mut self, log_n: u8, r: u32, p: u32) -> Self {
        self.log_n = log_n;
        self.r = r;
        self.p = p;
        self
    }

    /// Hash a plaintext secret with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if the entropy source fails or the cost parameters
    /// are rejected by the derivation function.
    pub fn hash(&self, secret: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .context("failed to generate password salt")?;
        let salt_hex = hex::encode(salt);
        let digest = self.derive(secret, salt_hex.as_bytes())?;
        Ok(format!("{}.{salt_hex}", hex::encode(digest)))
    }

    /// Verify a plaintext secret against a stored `digest.salt` value.
    ///
    /// Malformed stored values verify as false instead of erroring; the
    /// caller cannot tell a bad record apart from a wrong password. Digest
    /// comparison is constant time.
    #[must_use]
    pub fn verify(&self, secret: &str, stored: &str) -> bool {
        let Some((digest_hex, salt_hex)) = stored.split_once('.') else {
            return false;
        };
        let Ok(expected) = hex::decode(digest_hex) else {
            return false;
        };
        if expected.len() != DIGEST_LENGTH {
            return false;
        }
        let Ok(derived) = self.derive(secret, salt_hex.as_bytes()) else {
            return false;
        };
        derived.ct_eq(&expected).into()
    }

    fn derive(&self, secret: &str, salt: &[u8]) -> Result<[u8; DIGEST_LENGTH]> {
        let params = Params::new(self.log_n, self.r, self.p, DIGEST_LENGTH)
            .map_err(|err| anyhow!("invalid scrypt parameters: {err}"))?;
        let mut digest = [0u8; DIGEST_LENGTH];
        scrypt::scrypt(secret.as_bytes(), salt, &params, &mut digest)
            .map_err(|err| anyhow!("scrypt derivation failed: {err}"))?;
        Ok(digest)
    }
}
