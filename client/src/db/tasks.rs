//! Cache operations for the tasks table.

use sqlx::{Row, SqlitePool};
use taskflow_engine::{ModifiedStamp, TaskRecord};

/// A cached task row from the database.
#[derive(Debug)]
pub struct StoredTask {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub stage: String,
    pub priority: String,
    pub assignee: Option<String>,
    pub updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for StoredTask {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(StoredTask {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            stage: row.try_get("stage")?,
            priority: row.try_get("priority")?,
            assignee: row.try_get("assignee")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl StoredTask {
    /// Convert a database row to an engine task record.
    pub fn to_task(&self) -> Result<TaskRecord, taskflow_engine::Error> {
        Ok(TaskRecord {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            stage: self.stage.parse()?,
            priority: self.priority.parse()?,
            assignee: self.assignee.clone(),
            updated_at: ModifiedStamp::from_millis(self.updated_at as u64),
        })
    }
}

/// Upsert a single task (insert or update by id).
pub async fn upsert_task(pool: &SqlitePool, task: &TaskRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tasks (
            id, project_id, title, description, stage, priority, assignee, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT (id) DO UPDATE SET
            project_id = excluded.project_id,
            title = excluded.title,
            description = excluded.description,
            stage = excluded.stage,
            priority = excluded.priority,
            assignee = excluded.assignee,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&task.id)
    .bind(&task.project_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.stage.as_str())
    .bind(task.priority.as_str())
    .bind(&task.assignee)
    .bind(task.updated_at.millis() as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Upsert a batch of tasks. Each row is atomic on its own; the batch as
/// a whole is not a transaction.
pub async fn upsert_tasks(pool: &SqlitePool, tasks: &[TaskRecord]) -> Result<(), sqlx::Error> {
    for task in tasks {
        upsert_task(pool, task).await?;
    }
    Ok(())
}

/// Get a cached task by id.
pub async fn get_task(pool: &SqlitePool, id: &str) -> Result<Option<StoredTask>, sqlx::Error> {
    sqlx::query_as::<_, StoredTask>(
        r#"
        SELECT id, project_id, title, description, stage, priority, assignee, updated_at
        FROM tasks
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Get all cached tasks for a project. No ordering is guaranteed.
pub async fn get_project_tasks(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<StoredTask>, sqlx::Error> {
    sqlx::query_as::<_, StoredTask>(
        r#"
        SELECT id, project_id, title, description, stage, priority, assignee, updated_at
        FROM tasks
        WHERE project_id = ?1
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Remove a cached task. No-op when the id is absent.
pub async fn remove_task(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM tasks WHERE id = ?1"#)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};
    use taskflow_engine::{Priority, Stage};

    async fn test_pool() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn test_task(id: &str, project: &str) -> TaskRecord {
        TaskRecord::new(
            id,
            project,
            "Cached task",
            Stage::Todo,
            Priority::Medium,
            ModifiedStamp::from_millis(1000),
        )
    }

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let pool = test_pool().await;

        let task = test_task("task-1", "proj-1")
            .with_description("Full fields")
            .with_assignee("user-2");
        upsert_task(&pool, &task).await.unwrap();

        let stored = get_task(&pool, "task-1").await.unwrap().unwrap();
        assert_eq!(stored.to_task().unwrap(), task);
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let pool = test_pool().await;

        let mut task = test_task("task-1", "proj-1");
        upsert_task(&pool, &task).await.unwrap();

        task.title = "Renamed".to_string();
        task.updated_at = ModifiedStamp::from_millis(2000);
        upsert_task(&pool, &task).await.unwrap();

        let stored = get_task(&pool, "task-1").await.unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.updated_at, 2000);

        let all = get_project_tasks(&pool, "proj-1").await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn project_scoping() {
        let pool = test_pool().await;

        upsert_tasks(
            &pool,
            &[
                test_task("task-1", "proj-1"),
                test_task("task-2", "proj-1"),
                test_task("task-3", "proj-2"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(get_project_tasks(&pool, "proj-1").await.unwrap().len(), 2);
        assert_eq!(get_project_tasks(&pool, "proj-2").await.unwrap().len(), 1);
        assert!(get_project_tasks(&pool, "proj-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_missing_is_noop() {
        let pool = test_pool().await;

        remove_task(&pool, "ghost").await.unwrap();

        upsert_task(&pool, &test_task("task-1", "proj-1"))
            .await
            .unwrap();
        remove_task(&pool, "task-1").await.unwrap();
        assert!(get_task(&pool, "task-1").await.unwrap().is_none());
    }
}
