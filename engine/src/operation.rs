//! Operation types for expressing mutations.
//!
//! Mutations that cannot be applied immediately are expressed as
//! operations and queued; the orchestrator replays them against the
//! remote service once connectivity returns.

use crate::{ModifiedStamp, TaskId, TaskRecord};
use serde::{Deserialize, Serialize};

/// A create operation, carrying the full task to be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOp {
    /// The task to create
    pub task: TaskRecord,
}

/// An update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOp {
    /// Task ID to update
    pub id: TaskId,
    /// Changed fields (partial task body, sent as-is to the service)
    pub payload: serde_json::Value,
    /// The server stamp the client last saw for this task.
    /// Replay detects a conflict when the server has moved past it.
    pub base_stamp: ModifiedStamp,
}

/// A delete operation.
///
/// Deletes carry no base stamp: there is no conflict concept for them,
/// the last writer wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOp {
    /// Task ID to delete
    pub id: TaskId,
}

/// A mutation to replay against the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    Create(CreateOp),
    Update(UpdateOp),
    Delete(DeleteOp),
}

impl Operation {
    /// Build a create operation.
    pub fn create(task: TaskRecord) -> Self {
        Operation::Create(CreateOp { task })
    }

    /// Build an update operation.
    pub fn update(
        id: impl Into<TaskId>,
        payload: serde_json::Value,
        base_stamp: ModifiedStamp,
    ) -> Self {
        Operation::Update(UpdateOp {
            id: id.into(),
            payload,
            base_stamp,
        })
    }

    /// Build a delete operation.
    pub fn delete(id: impl Into<TaskId>) -> Self {
        Operation::Delete(DeleteOp { id: id.into() })
    }

    /// Get the task ID this operation targets.
    pub fn task_id(&self) -> &TaskId {
        match self {
            Operation::Create(op) => &op.task.id,
            Operation::Update(op) => &op.id,
            Operation::Delete(op) => &op.id,
        }
    }

    /// Wire name of the operation type.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Create(_) => "create",
            Operation::Update(_) => "update",
            Operation::Delete(_) => "delete",
        }
    }

    /// The payload replayed to the service, if the operation carries one.
    pub fn payload(&self) -> Option<serde_json::Value> {
        match self {
            Operation::Create(op) => Some(op.task.to_payload()),
            Operation::Update(op) => Some(op.payload.clone()),
            Operation::Delete(_) => None,
        }
    }

    /// The base stamp an update was captured against.
    pub fn base_stamp(&self) -> Option<ModifiedStamp> {
        match self {
            Operation::Update(op) => Some(op.base_stamp),
            _ => None,
        }
    }
}
