//! Administrator login, session introspection, and logout.
//!
//! This module coordinates password login, session lifetime, and resolution
//! of the administrator behind a request.
//!
//! ## Sessions
//!
//! Sessions are opaque 32-byte random tokens handed to the browser in an
//! `HttpOnly` cookie (`lulus_session`); a `Bearer` header is accepted as an
//! equivalent transport for non-browser clients. The server keeps only a
//! digest of each token, bound to the administrator id, for 24 hours by
//! default.
//!
//! ## Anti-enumeration
//!
//! Login answers every rejected attempt with the same message and status,
//! and unknown emails burn a derivation against a decoy hash so timing does
//! not separate "no such account" from "wrong password".

pub mod login;
pub(crate) mod principal;
pub mod session;
mod state;

pub use login::{LoginRequest, login};
pub use principal::{Principal, require_auth};
pub use session::{MeResponse, logout, me};
pub use state::{AuthConfig, AuthState};
