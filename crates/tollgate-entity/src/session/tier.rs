//! Session tier enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use tollgate_core::error::AppError;

/// The privilege tier a session belongs to.
///
/// Each tier is persisted in its own table. A token issued in one tier is
/// never looked up in the other, even if the same string were reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionTier {
    /// Ordinary user sessions.
    User,
    /// Administrator sessions.
    Admin,
}

impl SessionTier {
    /// All tiers, in a stable order.
    pub const ALL: [SessionTier; 2] = [SessionTier::User, SessionTier::Admin];

    /// Name of the table holding this tier's sessions.
    ///
    /// The only source of table names interpolated into SQL.
    pub fn table(&self) -> &'static str {
        match self {
            Self::User => "sessions",
            Self::Admin => "admin_sessions",
        }
    }

    /// Return the tier as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for SessionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(AppError::validation(format!("Unknown session tier '{other}'"))),
        }
    }
}
