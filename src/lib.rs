//! # Lulus (Graduation Announcement Service)
//!
//! `lulus` publishes gated graduation results for a school. A public visitor
//! submits a registration number (NIS) and birth date and receives a verdict,
//! but only while the administrator-controlled announcement window is open.
//!
//! ## Disclosure Gate
//!
//! Results stay hidden until an administrator explicitly opens the gate. The
//! scheduled announcement date is advisory metadata for countdown displays;
//! a date in the past never opens the gate by itself.
//!
//! ## Authentication
//!
//! Administrators sign in with email and password. Passwords are stored as
//! salted scrypt digests in `<digest_hex>.<salt_hex>` form and verified in
//! constant time. Sessions are opaque random tokens carried in an `HttpOnly`
//! cookie; the server keeps only a hash of each token.
//!
//! ## Anti-enumeration
//!
//! Public lookups never reveal which half of the check failed: an unknown
//! registration number and a wrong birth date produce byte-identical
//! responses, and every failed login gets the same generic message.

pub mod api;
pub mod cli;
pub mod hash;
pub mod seed;
pub mod session;
pub mod storage;

pub const GIT_COMMIT_HASH: &str = match option_env!("GIT_COMMIT_HASH") {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // builds outside git land here
            return;
        }
        assert!(GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
