//! # tollgate-auth
//!
//! Authentication and session management for Tollgate.
//!
//! ## Modules
//!
//! - `token`: random byte generation and the printable token encoding
//! - `password`: Argon2 password hashing and verification
//! - `session`: tiered session persistence (create, validate, invalidate)
//! - `cookie`: the request-scoped cookie jar seam
//! - `service`: login, session checks, privilege checks, and logout

pub mod cookie;
pub mod password;
pub mod service;
pub mod session;
pub mod token;

pub use cookie::{CookieAttributes, CookieJar, MemoryCookieJar, SessionCookie};
pub use password::PasswordHasher;
pub use service::{AuthenticatedSession, AuthenticationService};
pub use session::{MemoryBackend, PgBackend, SessionBackend, SessionStore, UserDirectory};
pub use token::{encode_token, generate_random_bytes, generate_token};
