//! The sync orchestrator - replays the pending queue against the remote
//! service and surfaces conflicts.
//!
//! One cycle: snapshot the queue, replay each entry in enqueue order,
//! classify every outcome (succeeded / transient failure / rejection /
//! conflict), then remove the acknowledged entries in one batch. A
//! cycle never throws for a single operation; per-operation outcomes
//! accumulate in the returned [`SyncSummary`]. An offline transition
//! observed mid-cycle aborts the remaining replays and leaves them
//! queued.

use crate::config::SyncConfig;
use crate::db::{self, Pool};
use crate::error::{Error, Result};
use crate::net::{ConnectivityMonitor, TaskRemote};
use crate::sync::{now_stamp, RejectedOp, SyncStatus, SyncSummary};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use taskflow_engine::{
    Conflict, ConflictId, ModifiedStamp, Operation, QueueId, Resolution, TaskRecord,
};
use tokio::sync::{watch, Mutex};

/// Outcome of replaying one queue entry.
enum Outcome {
    Succeeded,
    Conflicted(ConflictId),
    TransientFailure,
    Rejected { status: u16, message: String },
}

/// Replays queued mutations, detects version conflicts, and owns the
/// conflict-resolution API.
///
/// All collaborators are injected: the pool holding the cache and
/// queue, the remote transport, and the connectivity monitor. The
/// orchestrator serializes every queue mutation through itself; a
/// cycle holds an async mutex so two cycles can never interleave.
pub struct SyncOrchestrator {
    pool: Pool,
    remote: Arc<dyn TaskRemote>,
    monitor: ConnectivityMonitor,
    config: SyncConfig,
    conflicts: DashMap<ConflictId, Conflict>,
    cycle_lock: Mutex<()>,
    status_tx: watch::Sender<SyncStatus>,
}

impl SyncOrchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        pool: Pool,
        remote: Arc<dyn TaskRemote>,
        monitor: ConnectivityMonitor,
        config: SyncConfig,
    ) -> Self {
        let (status_tx, _rx) = watch::channel(SyncStatus::Idle);
        Self {
            pool,
            remote,
            monitor,
            config,
            conflicts: DashMap::new(),
            cycle_lock: Mutex::new(()),
            status_tx,
        }
    }

    /// Record a mutation for replay. Returns the queue id.
    pub async fn add_to_queue(&self, op: Operation) -> Result<QueueId> {
        let queue_id = db::enqueue_operation(&self.pool, &op, now_stamp()).await?;
        tracing::debug!(queue_id, kind = op.kind(), task_id = %op.task_id(), "operation queued");
        Ok(queue_id)
    }

    /// Subscribe to the user-visible sync status.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// The connectivity monitor this orchestrator watches.
    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// Open conflicts, oldest first.
    pub fn open_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts: Vec<_> = self
            .conflicts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        conflicts.sort_by_key(|c| (c.detected_at, c.queue_id));
        conflicts
    }

    /// Look up one open conflict.
    pub fn get_conflict(&self, id: &str) -> Option<Conflict> {
        self.conflicts.get(id).map(|entry| entry.value().clone())
    }

    /// Run one sync cycle.
    ///
    /// Returns [`Error::CycleInProgress`] without touching the queue if
    /// another cycle is already running.
    pub async fn run_cycle(&self) -> Result<SyncSummary> {
        let _guard = self
            .cycle_lock
            .try_lock()
            .map_err(|_| Error::CycleInProgress)?;

        let mut summary = SyncSummary::default();
        let now = now_stamp();

        if let Some(ttl) = self.config.conflict_ttl {
            self.expire_overdue_conflicts(ttl, now, &mut summary).await;
        }

        let batch = db::list_pending(&self.pool).await?;
        let blocked: HashSet<QueueId> = self
            .conflicts
            .iter()
            .map(|entry| entry.value().queue_id)
            .collect();

        self.status_tx.send_replace(SyncStatus::Syncing {
            pending: batch.len(),
        });
        tracing::info!(pending = batch.len(), "sync cycle started");

        // Entries acknowledged one way or the other; removed in one batch.
        let mut resolved_ids: Vec<QueueId> = Vec::new();

        for entry in batch {
            if !self.monitor.state().online {
                tracing::warn!(
                    queue_id = entry.id,
                    "offline mid-cycle, aborting remaining replays"
                );
                break;
            }
            if blocked.contains(&entry.id) {
                continue;
            }

            let op = match entry.to_operation() {
                Ok(op) => op,
                Err(e) => {
                    tracing::error!(queue_id = entry.id, error = %e, "corrupt queue entry, leaving for manual intervention");
                    summary.failed.push(entry.id);
                    continue;
                }
            };

            match self.replay(entry.id, &op, now).await {
                Outcome::Succeeded => {
                    summary.succeeded.push(entry.id);
                    resolved_ids.push(entry.id);
                }
                Outcome::Conflicted(conflict_id) => summary.conflicts.push(conflict_id),
                Outcome::TransientFailure => summary.failed.push(entry.id),
                Outcome::Rejected { status, message } => {
                    summary.rejected.push(RejectedOp {
                        queue_id: entry.id,
                        status,
                        message,
                    });
                    resolved_ids.push(entry.id);
                }
            }
        }

        db::remove_pending(&self.pool, &resolved_ids).await?;

        self.status_tx.send_replace(SyncStatus::Reconciled {
            succeeded: summary.succeeded.len(),
            failed: summary.failed.len(),
            conflicts: summary.conflicts.len(),
        });
        tracing::info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            rejected = summary.rejected.len(),
            conflicts = summary.conflicts.len(),
            "sync cycle finished"
        );

        Ok(summary)
    }

    /// Resolve an open conflict with an explicit strategy.
    ///
    /// On success the blocked queue entry is removed; on failure the
    /// conflict stays open so the caller can retry.
    pub async fn resolve_conflict(&self, conflict_id: &str, resolution: Resolution) -> Result<()> {
        let (_, conflict) = self
            .conflicts
            .remove(conflict_id)
            .ok_or_else(|| Error::ConflictNotFound(conflict_id.to_string()))?;

        let result = self.apply_resolution(&conflict, resolution).await;
        if result.is_err() {
            self.conflicts.insert(conflict.id.clone(), conflict);
        }
        result
    }

    async fn apply_resolution(&self, conflict: &Conflict, resolution: Resolution) -> Result<()> {
        match conflict.outgoing_payload(resolution)? {
            Some(payload) => {
                let saved = self.remote.update(&conflict.task_id, &payload).await?;
                db::upsert_task(&self.pool, &saved).await?;
            }
            None => {
                let server = TaskRecord::from_payload(&conflict.server_payload)?;
                db::upsert_task(&self.pool, &server).await?;
            }
        }
        db::remove_pending(&self.pool, &[conflict.queue_id]).await?;

        tracing::info!(
            conflict_id = %conflict.id,
            task_id = %conflict.task_id,
            ?resolution,
            "conflict resolved"
        );
        Ok(())
    }

    async fn expire_overdue_conflicts(
        &self,
        ttl: Duration,
        now: ModifiedStamp,
        summary: &mut SyncSummary,
    ) {
        let cutoff = now.millis().saturating_sub(ttl.as_millis() as u64);
        let overdue: Vec<ConflictId> = self
            .conflicts
            .iter()
            .filter(|entry| entry.value().detected_at.millis() <= cutoff)
            .map(|entry| entry.value().id.clone())
            .collect();

        for conflict_id in overdue {
            match self
                .resolve_conflict(&conflict_id, Resolution::AcceptServer)
                .await
            {
                Ok(()) => {
                    tracing::info!(conflict_id = %conflict_id, "conflict expired as accept-server");
                    summary.expired.push(conflict_id);
                }
                Err(e) => {
                    tracing::warn!(conflict_id = %conflict_id, error = %e, "conflict expiry failed, leaving open");
                }
            }
        }
    }

    async fn replay(&self, queue_id: QueueId, op: &Operation, now: ModifiedStamp) -> Outcome {
        // Updates check the server state first; a record that moved past
        // the captured base stamp becomes a conflict instead of a replay.
        if let Operation::Update(update) = op {
            match self.remote.fetch(&update.id).await {
                Ok(Some(server)) => {
                    let conflict_id = uuid::Uuid::new_v4().to_string();
                    if let Some(conflict) =
                        Conflict::detect(conflict_id, queue_id, update, &server, now)
                    {
                        tracing::info!(
                            queue_id,
                            task_id = %update.id,
                            base_stamp = %conflict.base_stamp,
                            server_stamp = %conflict.server_stamp,
                            "conflict detected, awaiting resolution"
                        );
                        let id = conflict.id.clone();
                        self.conflicts.insert(id.clone(), conflict);
                        return Outcome::Conflicted(id);
                    }
                }
                // Nothing newer to lose against; replay and let the
                // service's verdict stand.
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(queue_id, task_id = %update.id, error = %e, "conflict fetch failed");
                    return Outcome::TransientFailure;
                }
            }
        }

        let result = match op {
            Operation::Create(create) => self.remote.create(&create.task).await.map(Some),
            Operation::Update(update) => self
                .remote
                .update(&update.id, &update.payload)
                .await
                .map(Some),
            Operation::Delete(delete) => self.remote.delete(&delete.id).await.map(|_| None),
        };

        match result {
            Ok(saved) => {
                let cache_result = match (&saved, op) {
                    (Some(task), _) => db::upsert_task(&self.pool, task).await,
                    (None, Operation::Delete(delete)) => {
                        db::remove_task(&self.pool, &delete.id).await
                    }
                    _ => Ok(()),
                };
                if let Err(e) = cache_result {
                    // The server applied the write; keeping the entry
                    // queued gives at-least-once replay, which is safe
                    // for these idempotent verbs.
                    tracing::error!(queue_id, error = %e, "cache write failed after replay, entry stays queued");
                    return Outcome::TransientFailure;
                }
                tracing::debug!(queue_id, kind = op.kind(), "replayed");
                Outcome::Succeeded
            }
            Err(Error::Rejected { status, message }) if status < 500 => {
                tracing::warn!(queue_id, status, "service rejected operation");
                Outcome::Rejected { status, message }
            }
            Err(e) if e.is_transient() => {
                tracing::debug!(queue_id, error = %e, "transient replay failure");
                Outcome::TransientFailure
            }
            Err(e) => {
                tracing::error!(queue_id, error = %e, "replay failed, leaving queued");
                Outcome::TransientFailure
            }
        }
    }
}

/// Spawn a task that runs a cycle on every offline-to-online
/// transition. Abort the returned handle to stop.
pub fn spawn_on_reconnect(orchestrator: Arc<SyncOrchestrator>) -> tokio::task::JoinHandle<()> {
    let mut rx = orchestrator.monitor.subscribe();
    // Captured at subscribe time: a transition that lands between
    // subscribing and the first poll still compares against the state
    // the subscription actually saw.
    let mut was_online = rx.borrow().online;
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let online = rx.borrow_and_update().online;
            if online && !was_online {
                match orchestrator.run_cycle().await {
                    Ok(summary) => tracing::info!(
                        succeeded = summary.succeeded.len(),
                        conflicts = summary.conflicts.len(),
                        "reconnect sync finished"
                    ),
                    Err(Error::CycleInProgress) => {}
                    Err(e) => tracing::error!(error = %e, "reconnect sync failed"),
                }
            }
            was_online = online;
        }
    })
}
