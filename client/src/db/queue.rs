//! The pending-operation queue.
//!
//! Durable record of mutations that could not be applied immediately.
//! Entries are replayed in enqueue (id) order and deleted only after the
//! orchestrator confirms the server applied them, so the queue is the
//! single source of truth for unacknowledged work.

use sqlx::{Row, SqlitePool};
use taskflow_engine::{
    CreateOp, DeleteOp, ModifiedStamp, Operation, QueueId, TaskRecord, UpdateOp,
};

/// A queued operation row from the database.
#[derive(Debug)]
pub struct StoredOperation {
    pub id: QueueId,
    pub op_type: String,
    pub task_id: String,
    pub payload: Option<serde_json::Value>,
    pub base_stamp: Option<i64>,
    pub enqueued_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for StoredOperation {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(StoredOperation {
            id: row.try_get("id")?,
            op_type: row.try_get("op_type")?,
            task_id: row.try_get("task_id")?,
            payload: row.try_get("payload")?,
            base_stamp: row.try_get("base_stamp")?,
            enqueued_at: row.try_get("enqueued_at")?,
        })
    }
}

impl StoredOperation {
    /// Convert a database row back to an engine operation.
    pub fn to_operation(&self) -> Result<Operation, taskflow_engine::Error> {
        match self.op_type.as_str() {
            "create" => {
                let payload = self.payload.clone().unwrap_or(serde_json::Value::Null);
                let task = TaskRecord::from_payload(&payload)?;
                Ok(Operation::Create(CreateOp { task }))
            }
            "update" => {
                let payload = self.payload.clone().unwrap_or(serde_json::Value::Null);
                let base_stamp =
                    ModifiedStamp::from_millis(self.base_stamp.unwrap_or(0) as u64);
                Ok(Operation::Update(UpdateOp {
                    id: self.task_id.clone(),
                    payload,
                    base_stamp,
                }))
            }
            "delete" => Ok(Operation::Delete(DeleteOp {
                id: self.task_id.clone(),
            })),
            other => Err(taskflow_engine::Error::UnknownOperationType(
                other.to_string(),
            )),
        }
    }
}

/// Append an operation with a generated increasing id and a capture
/// stamp. Returns the queue id.
pub async fn enqueue_operation(
    pool: &SqlitePool,
    op: &Operation,
    enqueued_at: ModifiedStamp,
) -> Result<QueueId, sqlx::Error> {
    let payload = op.payload();
    let base_stamp = op.base_stamp().map(|s| s.millis() as i64);

    let result: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO pending_ops (op_type, task_id, payload, base_stamp, enqueued_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id
        "#,
    )
    .bind(op.kind())
    .bind(op.task_id())
    .bind(payload)
    .bind(base_stamp)
    .bind(enqueued_at.millis() as i64)
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}

/// Get all queued operations in enqueue order.
pub async fn list_pending(pool: &SqlitePool) -> Result<Vec<StoredOperation>, sqlx::Error> {
    sqlx::query_as::<_, StoredOperation>(
        r#"
        SELECT id, op_type, task_id, payload, base_stamp, enqueued_at
        FROM pending_ops
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Delete the given queue entries after confirmed replay.
pub async fn remove_pending(pool: &SqlitePool, ids: &[QueueId]) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("DELETE FROM pending_ops WHERE id IN ({placeholders})");

    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }
    query.execute(pool).await?;

    Ok(())
}

/// Count of queued operations.
pub async fn pending_count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let result: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM pending_ops"#)
        .fetch_one(pool)
        .await?;

    Ok(result.0)
}
