//! The cookie jar seam between the authentication core and HTTP transport.
//!
//! The core never touches headers. It reads and writes named values
//! through a request-scoped [`CookieJar`]; the web layer decides how those
//! become `Cookie` and `Set-Cookie` headers.

pub mod memory;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use tollgate_core::config::{SameSitePolicy, SessionConfig};

pub use memory::MemoryCookieJar;

/// Cookie carrying the authenticated user's name.
pub const USERNAME_COOKIE: &str = "username";
/// Cookie carrying the opaque session token.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie carrying a one-shot status message for the next page render.
pub const MESSAGE_COOKIE: &str = "message";

/// Attributes applied to every cookie the core writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieAttributes {
    /// `Domain` attribute; host-only when `None`.
    pub domain: Option<String>,
    /// `Path` attribute.
    pub path: String,
    /// `Secure` attribute.
    pub secure: bool,
    /// `HttpOnly` attribute.
    pub http_only: bool,
    /// `SameSite` attribute.
    pub same_site: SameSitePolicy,
    /// `Max-Age`; a session cookie when `None`.
    pub max_age: Option<Duration>,
}

impl CookieAttributes {
    /// Attributes for session cookies, derived from configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            domain: config.cookie_domain.clone(),
            path: config.cookie_path.clone(),
            secure: config.cookie_secure,
            http_only: true,
            same_site: config.cookie_same_site,
            max_age: Some(config.ttl()),
        }
    }
}

/// A named cookie value with its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Cookie attributes.
    pub attributes: CookieAttributes,
}

impl SessionCookie {
    /// Build a cookie.
    pub fn new(name: &str, value: impl Into<String>, attributes: CookieAttributes) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            attributes,
        }
    }
}

/// Request-scoped access to client cookies.
///
/// Implementations wrap whatever the web framework exposes for the current
/// request and response. An empty value must be reported as absent.
pub trait CookieJar: Send {
    /// Read a cookie sent by the client, or written earlier in this request.
    fn get(&self, name: &str) -> Option<String>;

    /// Write a cookie to the response.
    fn set(&mut self, cookie: SessionCookie);

    /// Remove a cookie from the client.
    fn clear(&mut self, name: &str);
}
