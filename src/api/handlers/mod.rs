//! Route handlers for the lulus API.
//!
//! Public surface: gate status, the gated outcome check, and health probes.
//! Administrative surface: roster management and gate configuration, all
//! behind [`auth::require_auth`].

pub mod auth;
pub mod check;
pub mod health;
pub mod settings;
pub mod students;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain acknowledgement body shared by login/logout style endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Lightweight email sanity check used by the login handler before any store
/// access.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
