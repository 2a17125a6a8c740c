//! Session and cookie configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted session lifetime: ten years.
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Session lifetime and client cookie attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a session row, and max-age of the session cookies, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Cookie `Domain` attribute. Host-only cookies when unset.
    #[serde(default)]
    pub cookie_domain: Option<String>,
    /// Cookie `Path` attribute.
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,
    /// Whether cookies carry the `Secure` attribute.
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Cookie `SameSite` attribute.
    #[serde(default)]
    pub cookie_same_site: SameSitePolicy,
    /// Upper bound on any single session store call, in seconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_seconds: u64,
}

impl SessionConfig {
    /// Session lifetime as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Store call deadline as a [`Duration`].
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_seconds)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.ttl_seconds == 0 {
            return Err(AppError::configuration(
                "session.ttl_seconds must be greater than zero",
            ));
        }
        if self.ttl_seconds > MAX_TTL_SECONDS {
            return Err(AppError::configuration(format!(
                "session.ttl_seconds must not exceed {MAX_TTL_SECONDS}"
            )));
        }
        if self.store_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "session.store_timeout_seconds must be greater than zero",
            ));
        }
        if self.cookie_same_site == SameSitePolicy::None && !self.cookie_secure {
            return Err(AppError::configuration(
                "session.cookie_same_site = \"none\" requires cookie_secure = true",
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            cookie_domain: None,
            cookie_path: default_cookie_path(),
            cookie_secure: true,
            cookie_same_site: SameSitePolicy::default(),
            store_timeout_seconds: default_store_timeout(),
        }
    }
}

/// Cookie `SameSite` policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    /// Sent only on same-site requests.
    Strict,
    /// Sent on same-site requests and top-level navigations.
    #[default]
    Lax,
    /// Sent on all requests; requires `Secure`.
    None,
}

impl fmt::Display for SameSitePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
            Self::None => write!(f, "None"),
        }
    }
}

impl FromStr for SameSitePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            other => Err(AppError::configuration(format!(
                "Unknown SameSite policy '{other}'"
            ))),
        }
    }
}

fn default_ttl() -> u64 {
    3600
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_store_timeout() -> u64 {
    5
}
