//! Tiered session persistence.
//!
//! State per `(tier, username)`: no session, then active after
//! `create_session`, then expired (judged lazily at validation time) or
//! invalidated by `invalidate_sessions`.

pub mod backend;
pub mod memory;
pub mod postgres;
pub mod store;

use std::future::Future;
use std::time::Duration;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;

pub use backend::{SessionBackend, UserDirectory};
pub use memory::MemoryBackend;
pub use postgres::PgBackend;
pub use store::SessionStore;

/// Run a store operation, failing with `StoreUnavailable` if it does not
/// finish within `limit`.
pub(crate) async fn with_deadline<T, F>(limit: Duration, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::store_unavailable(format!(
            "{operation} timed out after {}ms",
            limit.as_millis()
        ))),
    }
}
