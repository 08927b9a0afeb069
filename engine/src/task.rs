//! Task records - the entities being cached and synced.

use crate::{Error, ModifiedStamp, ProjectId, Result, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow stage of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Todo,
    InProgress,
    Review,
    Completed,
}

impl Stage {
    /// The wire string for this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Todo => "todo",
            Stage::InProgress => "in-progress",
            Stage::Review => "review",
            Stage::Completed => "completed",
        }
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "todo" => Ok(Stage::Todo),
            "in-progress" => Ok(Stage::InProgress),
            "review" => Ok(Stage::Review),
            "completed" => Ok(Stage::Completed),
            other => Err(Error::UnknownStage(other.to_string())),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// The wire string for this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::UnknownPriority(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task record as cached locally and exchanged with the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Unique identifier for this task
    pub id: TaskId,
    /// Project this task belongs to
    pub project_id: ProjectId,
    /// Task title
    pub title: String,
    /// Optional longer description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workflow stage
    pub stage: Stage,
    /// Priority
    pub priority: Priority,
    /// Assigned user, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Server-side last-modified stamp
    pub updated_at: ModifiedStamp,
}

impl TaskRecord {
    /// Create a new task record.
    pub fn new(
        id: impl Into<TaskId>,
        project_id: impl Into<ProjectId>,
        title: impl Into<String>,
        stage: Stage,
        priority: Priority,
        updated_at: ModifiedStamp,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            title: title.into(),
            description: None,
            stage,
            priority,
            assignee: None,
            updated_at,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the assignee.
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Serialize this record to a JSON payload.
    pub fn to_payload(&self) -> serde_json::Value {
        // TaskRecord always serializes; the fields are plain data.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Parse a record from a JSON payload.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(payload.clone())
            .map_err(|e| Error::InvalidTaskPayload(e.to_string()))
    }
}
