//! Session repository implementation.
//!
//! Every query takes the [`SessionTier`] and reads or writes only that
//! tier's table. Expiry is always judged by the database clock.

use std::time::Duration;

use sqlx::PgPool;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::session::{Session, SessionTier};

/// Repository for session rows in both tiers.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a session for the user named `username`, expiring `ttl` from now.
    ///
    /// Returns `None` when no such user exists. Existing sessions are left
    /// untouched.
    pub async fn create(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
        ttl: Duration,
    ) -> AppResult<Option<Session>> {
        let sql = format!(
            "INSERT INTO {} (user_id, token, expires_at) \
             SELECT id, $2, NOW() + make_interval(secs => $3) FROM users WHERE name = $1 \
             RETURNING id, user_id, token, created_at, expires_at",
            tier.table()
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(username)
            .bind(token)
            .bind(ttl.as_secs_f64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to create session", e)
            })
    }

    /// Check for an unexpired session matching user and token.
    pub async fn exists_active(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
    ) -> AppResult<bool> {
        let sql = format!(
            "SELECT EXISTS ( \
                SELECT 1 FROM {} s JOIN users u ON s.user_id = u.id \
                WHERE u.name = $1 AND s.token = $2 AND s.expires_at > NOW() \
             )",
            tier.table()
        );

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(username)
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to validate session", e)
            })
    }

    /// Delete every session of a user in the tier. Returns the number removed.
    pub async fn delete_by_username(&self, tier: SessionTier, username: &str) -> AppResult<u64> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id IN (SELECT id FROM users WHERE name = $1)",
            tier.table()
        );

        let result = sqlx::query(&sql)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to delete sessions", e)
            })?;

        Ok(result.rows_affected())
    }

    /// Delete every expired row in the tier. Returns the number removed.
    pub async fn delete_expired(&self, tier: SessionTier) -> AppResult<u64> {
        let sql = format!("DELETE FROM {} WHERE expires_at <= NOW()", tier.table());

        let result = sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StoreUnavailable,
                    "Failed to purge expired sessions",
                    e,
                )
            })?;

        Ok(result.rows_affected())
    }

    /// Count unexpired sessions in the tier.
    pub async fn count_active(&self, tier: SessionTier) -> AppResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE expires_at > NOW()",
            tier.table()
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to count sessions", e)
            })
    }
}
