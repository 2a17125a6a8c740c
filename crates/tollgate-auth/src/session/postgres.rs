//! PostgreSQL-backed session and user storage.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_database::repositories::{SessionRepository, UserRepository};
use tollgate_entity::session::{Session, SessionTier};

use super::backend::{SessionBackend, UserDirectory};

/// Session and user storage over the database repositories.
#[derive(Debug, Clone)]
pub struct PgBackend {
    users: UserRepository,
    sessions: SessionRepository,
}

impl PgBackend {
    /// Creates a backend sharing `pool` between both repositories.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
        }
    }
}

#[async_trait]
impl SessionBackend for PgBackend {
    async fn insert_session(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
        ttl: Duration,
    ) -> AppResult<Session> {
        self.sessions
            .create(tier, username, token, ttl)
            .await?
            .ok_or_else(|| {
                AppError::store_unavailable(format!(
                    "No account row to attach a {tier} session to"
                ))
            })
    }

    async fn session_exists(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
    ) -> AppResult<bool> {
        self.sessions.exists_active(tier, username, token).await
    }

    async fn delete_sessions(&self, tier: SessionTier, username: &str) -> AppResult<u64> {
        self.sessions.delete_by_username(tier, username).await
    }

    async fn purge_expired(&self, tier: SessionTier) -> AppResult<u64> {
        self.sessions.delete_expired(tier).await
    }

    async fn count_active(&self, tier: SessionTier) -> AppResult<i64> {
        self.sessions.count_active(tier).await
    }
}

#[async_trait]
impl UserDirectory for PgBackend {
    async fn password_hash(&self, username: &str, tier: SessionTier) -> AppResult<Option<String>> {
        self.users.find_password_hash(username, tier).await
    }

    async fn is_admin(&self, username: &str) -> AppResult<Option<bool>> {
        self.users.find_is_admin(username).await
    }
}
