//! Arbitrary user data keyed by id - the cache store's second half,
//! used for preferences, filters, and other per-user state that must
//! survive restarts.

use sqlx::{Row, SqlitePool};

/// Upsert a user-data value under the given key.
pub async fn put_user_data(
    pool: &SqlitePool,
    key: &str,
    value: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_data (key, value)
        VALUES (?1, ?2)
        ON CONFLICT (key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a user-data value by key.
pub async fn get_user_data(
    pool: &SqlitePool,
    key: &str,
) -> Result<Option<serde_json::Value>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT value FROM user_data WHERE key = ?1"#)
        .bind(key)
        .fetch_optional(pool)
        .await?;

    row.map(|r| r.try_get("value")).transpose()
}
