//! Conflict detection and resolution for replayed updates.
//!
//! A conflict exists when the server's record moved past the state the
//! client captured while queuing an update. Detection is a single stamp
//! comparison; resolution is always an explicit caller decision, never
//! automatic.
//!
//! # Algorithm
//!
//! 1. Before replaying an UPDATE, fetch the current server record
//! 2. If the server stamp strictly supersedes the operation's base stamp,
//!    emit a [`Conflict`] and leave the operation queued
//! 3. The caller resolves with a [`Resolution`]: keep the local payload,
//!    keep the server record, or shallow-merge (client wins on overlap)

use crate::{
    ConflictId, Error, ModifiedStamp, QueueId, Result, TaskId, TaskRecord, UpdateOp,
};
use serde::{Deserialize, Serialize};

/// Strategy for resolving a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    /// Force-push the client payload, discarding the server's newer write
    AcceptLocal,
    /// Keep the server record, discarding the queued operation
    AcceptServer,
    /// Shallow-merge server fields with client fields, client wins on
    /// overlapping keys, then re-submit
    Merge,
}

/// A detected divergence between a queued update and the server record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Identifier assigned when the conflict was registered
    pub id: ConflictId,
    /// Queue entry blocked by this conflict
    pub queue_id: QueueId,
    /// The task both sides wrote
    pub task_id: TaskId,
    /// The payload the client queued
    pub client_payload: serde_json::Value,
    /// The server record at replay time
    pub server_payload: serde_json::Value,
    /// Stamp the client captured when queuing
    pub base_stamp: ModifiedStamp,
    /// Server stamp observed at replay time
    pub server_stamp: ModifiedStamp,
    /// When the conflict was detected
    pub detected_at: ModifiedStamp,
}

impl Conflict {
    /// Check a queued update against the current server record.
    ///
    /// Returns a conflict exactly when the server stamp strictly
    /// supersedes the stamp the client captured; an equal or older server
    /// stamp means the update may replay.
    pub fn detect(
        id: impl Into<ConflictId>,
        queue_id: QueueId,
        op: &UpdateOp,
        server: &TaskRecord,
        detected_at: ModifiedStamp,
    ) -> Option<Conflict> {
        if !server.updated_at.supersedes(op.base_stamp) {
            return None;
        }

        Some(Conflict {
            id: id.into(),
            queue_id,
            task_id: op.id.clone(),
            client_payload: op.payload.clone(),
            server_payload: server.to_payload(),
            base_stamp: op.base_stamp,
            server_stamp: server.updated_at,
            detected_at,
        })
    }

    /// The payload to push when resolving with the given strategy.
    ///
    /// `AcceptServer` pushes nothing; `AcceptLocal` pushes the client
    /// payload as-is; `Merge` pushes the shallow merge.
    pub fn outgoing_payload(&self, resolution: Resolution) -> Result<Option<serde_json::Value>> {
        match resolution {
            Resolution::AcceptLocal => Ok(Some(self.client_payload.clone())),
            Resolution::AcceptServer => Ok(None),
            Resolution::Merge => {
                merge_payloads(&self.server_payload, &self.client_payload).map(Some)
            }
        }
    }
}

/// Shallow-merge two JSON object payloads: start from the server fields,
/// overlay every client field, client wins on overlapping keys. Nested
/// objects are replaced wholesale, not merged.
pub fn merge_payloads(
    server: &serde_json::Value,
    client: &serde_json::Value,
) -> Result<serde_json::Value> {
    let server_map = server
        .as_object()
        .ok_or_else(|| Error::PayloadNotObject("server".to_string()))?;
    let client_map = client
        .as_object()
        .ok_or_else(|| Error::PayloadNotObject("client".to_string()))?;

    let mut merged = server_map.clone();
    for (key, value) in client_map {
        merged.insert(key.clone(), value.clone());
    }

    Ok(serde_json::Value::Object(merged))
}
