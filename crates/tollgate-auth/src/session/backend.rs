//! Persistence seams used by the session store and the authentication service.

use std::time::Duration;

use async_trait::async_trait;

use tollgate_core::result::AppResult;
use tollgate_entity::session::{Session, SessionTier};

/// Storage for session rows, partitioned by tier.
///
/// Implementations must keep the tiers disjoint: a row written for one
/// tier is never visible through the other.
#[async_trait]
pub trait SessionBackend: Send + Sync + std::fmt::Debug {
    /// Insert a session for `username` expiring `ttl` from now.
    ///
    /// Never replaces or reads existing rows. Fails with `StoreUnavailable`
    /// if the user cannot be resolved or the write fails.
    async fn insert_session(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
        ttl: Duration,
    ) -> AppResult<Session>;

    /// Whether an unexpired row exists for this user and token.
    async fn session_exists(&self, tier: SessionTier, username: &str, token: &str)
    -> AppResult<bool>;

    /// Delete all rows for the user. Returns how many were removed.
    async fn delete_sessions(&self, tier: SessionTier, username: &str) -> AppResult<u64>;

    /// Delete all expired rows. Returns how many were removed.
    async fn purge_expired(&self, tier: SessionTier) -> AppResult<u64>;

    /// Count unexpired rows.
    async fn count_active(&self, tier: SessionTier) -> AppResult<i64>;
}

/// Read-only access to account records.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Password hash of a user allowed to enter `tier`, or `None`.
    async fn password_hash(&self, username: &str, tier: SessionTier) -> AppResult<Option<String>>;

    /// Administrator flag of a user, or `None` if the user does not exist.
    async fn is_admin(&self, username: &str) -> AppResult<Option<bool>>;
}
