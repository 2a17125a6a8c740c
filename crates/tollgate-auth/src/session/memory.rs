//! In-memory session and user storage for single-process use and tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_entity::session::{Session, SessionTier};
use tollgate_entity::user::User;

use super::backend::{SessionBackend, UserDirectory};

#[derive(Debug, Default)]
struct InnerState {
    /// Accounts keyed by name.
    users: HashMap<String, User>,
    /// Rows of the user tier.
    user_sessions: Vec<Session>,
    /// Rows of the admin tier.
    admin_sessions: Vec<Session>,
}

impl InnerState {
    fn partition(&self, tier: SessionTier) -> &Vec<Session> {
        match tier {
            SessionTier::User => &self.user_sessions,
            SessionTier::Admin => &self.admin_sessions,
        }
    }

    fn partition_mut(&mut self, tier: SessionTier) -> &mut Vec<Session> {
        match tier {
            SessionTier::User => &mut self.user_sessions,
            SessionTier::Admin => &mut self.admin_sessions,
        }
    }

    fn insert(
        &mut self,
        tier: SessionTier,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let user_id = self
            .users
            .get(username)
            .map(|u| u.id)
            .ok_or_else(|| {
                AppError::store_unavailable(format!(
                    "No account row to attach a {tier} session to"
                ))
            })?;

        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            created_at: Utc::now(),
            expires_at,
        };
        self.partition_mut(tier).push(session.clone());
        Ok(session)
    }
}

/// Session and user storage held in process memory.
///
/// Tiers are kept in separate vectors, mirroring the separate tables of
/// the database schema.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an account.
    pub async fn add_user(&self, name: &str, password_hash: &str, is_admin: bool) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
            created_at: Utc::now(),
        };
        let mut state = self.state.lock().await;
        state.users.insert(name.to_string(), user.clone());
        user
    }

    /// Inserts a session with an explicit expiry time.
    pub async fn insert_session_expiring_at(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let mut state = self.state.lock().await;
        state.insert(tier, username, token, expires_at)
    }

    /// Number of rows, expired or not, held for a user in a tier.
    pub async fn row_count(&self, tier: SessionTier, username: &str) -> usize {
        let state = self.state.lock().await;
        let Some(user_id) = state.users.get(username).map(|u| u.id) else {
            return 0;
        };
        state
            .partition(tier)
            .iter()
            .filter(|s| s.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    async fn insert_session(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
        ttl: Duration,
    ) -> AppResult<Session> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::store_unavailable(format!("Session TTL out of range: {e}")))?;
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            AppError::store_unavailable("Session expiry overflows the timestamp range")
        })?;
        let mut state = self.state.lock().await;
        state.insert(tier, username, token, expires_at)
    }

    async fn session_exists(
        &self,
        tier: SessionTier,
        username: &str,
        token: &str,
    ) -> AppResult<bool> {
        let state = self.state.lock().await;
        let Some(user_id) = state.users.get(username).map(|u| u.id) else {
            return Ok(false);
        };
        let now = Utc::now();
        Ok(state
            .partition(tier)
            .iter()
            .any(|s| s.user_id == user_id && s.token == token && s.is_active_at(now)))
    }

    async fn delete_sessions(&self, tier: SessionTier, username: &str) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let Some(user_id) = state.users.get(username).map(|u| u.id) else {
            return Ok(0);
        };
        let rows = state.partition_mut(tier);
        let before = rows.len();
        rows.retain(|s| s.user_id != user_id);
        let removed = (before - rows.len()) as u64;
        debug!(tier = %tier, removed, "Deleted in-memory sessions");
        Ok(removed)
    }

    async fn purge_expired(&self, tier: SessionTier) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let rows = state.partition_mut(tier);
        let before = rows.len();
        rows.retain(|s| s.is_active_at(now));
        Ok((before - rows.len()) as u64)
    }

    async fn count_active(&self, tier: SessionTier) -> AppResult<i64> {
        let state = self.state.lock().await;
        let now = Utc::now();
        Ok(state
            .partition(tier)
            .iter()
            .filter(|s| s.is_active_at(now))
            .count() as i64)
    }
}

#[async_trait]
impl UserDirectory for MemoryBackend {
    async fn password_hash(&self, username: &str, tier: SessionTier) -> AppResult<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .get(username)
            .filter(|u| u.may_enter(tier))
            .map(|u| u.password_hash.clone()))
    }

    async fn is_admin(&self, username: &str) -> AppResult<Option<bool>> {
        let state = self.state.lock().await;
        Ok(state.users.get(username).map(|u| u.is_admin))
    }
}
