//! Session store: create, validate, and invalidate sessions per tier.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tollgate_core::config::SessionConfig;
use tollgate_core::result::AppResult;
use tollgate_entity::session::{Session, SessionTier};

use super::backend::SessionBackend;
use super::with_deadline;

/// Tier-aware session persistence with deadlines on every backend call.
#[derive(Debug, Clone)]
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    config: SessionConfig,
}

impl SessionStore {
    /// Creates a store over `backend`.
    pub fn new(backend: Arc<dyn SessionBackend>, config: SessionConfig) -> Self {
        Self { backend, config }
    }

    /// Records a new active session expiring one TTL from now.
    ///
    /// Sessions are not exclusive: a user may hold any number of active
    /// sessions per tier.
    pub async fn create_session(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
    ) -> AppResult<Session> {
        let session = with_deadline(
            self.config.store_timeout(),
            "create_session",
            self.backend
                .insert_session(tier, username, token, self.config.ttl()),
        )
        .await?;

        info!(
            tier = %tier,
            user = %username,
            session_id = %session.id,
            expires_at = %session.expires_at,
            "Session created"
        );
        Ok(session)
    }

    /// Whether `token` is an unexpired session of `username` in `tier`.
    ///
    /// Fails closed: any backend error or timeout is logged and reported as
    /// not valid.
    pub async fn validate_session(&self, tier: SessionTier, username: &str, token: &str) -> bool {
        let result = with_deadline(
            self.config.store_timeout(),
            "validate_session",
            self.backend.session_exists(tier, username, token),
        )
        .await;

        match result {
            Ok(valid) => {
                debug!(tier = %tier, user = %username, valid, "Session validated");
                valid
            }
            Err(e) => {
                warn!(tier = %tier, user = %username, error = %e, "Session validation failed");
                false
            }
        }
    }

    /// Removes every session of `username` in `tier`.
    ///
    /// Having nothing to remove is not an error. Returns the number removed.
    pub async fn invalidate_sessions(&self, tier: SessionTier, username: &str) -> AppResult<u64> {
        let removed = with_deadline(
            self.config.store_timeout(),
            "invalidate_sessions",
            self.backend.delete_sessions(tier, username),
        )
        .await?;

        info!(tier = %tier, user = %username, removed, "Sessions invalidated");
        Ok(removed)
    }

    /// Deletes expired rows in `tier`. Never called on the request path.
    pub async fn purge_expired(&self, tier: SessionTier) -> AppResult<u64> {
        let removed = with_deadline(
            self.config.store_timeout(),
            "purge_expired",
            self.backend.purge_expired(tier),
        )
        .await?;

        info!(tier = %tier, removed, "Expired sessions purged");
        Ok(removed)
    }

    /// Counts unexpired sessions in `tier`.
    pub async fn count_active(&self, tier: SessionTier) -> AppResult<i64> {
        with_deadline(
            self.config.store_timeout(),
            "count_active",
            self.backend.count_active(tier),
        )
        .await
    }
}
