//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::session::SessionTier;

/// A registered account.
///
/// Accounts are provisioned outside the authentication core; the core
/// only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub name: String,
    /// Argon2 password hash in PHC string format.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account holds administrator privileges.
    pub is_admin: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check whether this account may hold a session in the given tier.
    pub fn may_enter(&self, tier: SessionTier) -> bool {
        match tier {
            SessionTier::User => true,
            SessionTier::Admin => self.is_admin,
        }
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired login name.
    pub name: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Administrator flag.
    pub is_admin: bool,
}
