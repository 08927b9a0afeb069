//! Database module for the local SQLite cache and queue.

mod pool;
mod queue;
mod tasks;
mod user_data;

pub use pool::*;
pub use queue::*;
pub use tasks::*;
pub use user_data::*;

use sqlx::SqlitePool;

/// Wipe every store - tasks, user data, and the pending queue.
///
/// Used on logout. The call completes only once all three tables are
/// empty, so a read issued after it resolves cannot observe stale data.
pub async fn clear_all(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM tasks"#).execute(pool).await?;
    sqlx::query(r#"DELETE FROM pending_ops"#).execute(pool).await?;
    sqlx::query(r#"DELETE FROM user_data"#).execute(pool).await?;

    Ok(())
}
