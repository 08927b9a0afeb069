//! Cycle summaries and the user-visible sync status.

use serde::Serialize;
use taskflow_engine::{ConflictId, QueueId};

/// An operation the service rejected with a final (4xx) status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedOp {
    /// Queue entry that was dropped
    pub queue_id: QueueId,
    /// HTTP status the service answered with
    pub status: u16,
    /// Service-provided message, if any
    pub message: String,
}

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    /// Queue ids replayed and acknowledged; removed from the queue
    pub succeeded: Vec<QueueId>,
    /// Queue ids that hit transient failures; still queued for the next cycle
    pub failed: Vec<QueueId>,
    /// Operations the service rejected; removed from the queue and surfaced
    pub rejected: Vec<RejectedOp>,
    /// Conflicts detected this cycle; their queue entries stay queued
    /// until resolved
    pub conflicts: Vec<ConflictId>,
    /// Conflicts auto-resolved as accept-server because they outlived
    /// the configured TTL
    pub expired: Vec<ConflictId>,
}

/// User-visible sync state, fanned out through a watch channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SyncStatus {
    /// No cycle running and none has completed yet
    Idle,
    /// A cycle is draining the queue
    Syncing { pending: usize },
    /// The last cycle's headline numbers
    Reconciled {
        succeeded: usize,
        failed: usize,
        conflicts: usize,
    },
}
