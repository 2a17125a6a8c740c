//! User repository implementation.

use sqlx::PgPool;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::session::SessionTier;
use tollgate_entity::user::{CreateUser, User};

/// Repository for account lookups and provisioning.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the password hash of a user eligible for `tier`.
    ///
    /// Admin-tier lookups only match accounts with `is_admin = true`, so a
    /// non-admin never gets a hash to compare against.
    pub async fn find_password_hash(
        &self,
        name: &str,
        tier: SessionTier,
    ) -> AppResult<Option<String>> {
        let sql = match tier {
            SessionTier::User => "SELECT password_hash FROM users WHERE name = $1",
            SessionTier::Admin => {
                "SELECT password_hash FROM users WHERE name = $1 AND is_admin = TRUE"
            }
        };

        sqlx::query_scalar::<_, String>(sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to fetch password", e)
            })
    }

    /// Read the administrator flag of a user. `None` when the user does not exist.
    pub async fn find_is_admin(&self, name: &str) -> AppResult<Option<bool>> {
        sqlx::query_scalar::<_, bool>("SELECT is_admin FROM users WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to read admin flag", e)
            })
    }

    /// List all users ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StoreUnavailable, "Failed to list users", e))
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, password_hash, is_admin) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.password_hash)
        .bind(data.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_name_key") => {
                AppError::conflict(format!("User '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::StoreUnavailable, "Failed to create user", e),
        })
    }

    /// Grant or withdraw administrator privileges.
    pub async fn set_admin(&self, name: &str, is_admin: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>("UPDATE users SET is_admin = $2 WHERE name = $1 RETURNING *")
            .bind(name)
            .bind(is_admin)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to update admin flag", e)
            })?
            .ok_or_else(|| AppError::not_found(format!("User '{name}' not found")))
    }
}
