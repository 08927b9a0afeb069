//! # TaskFlow Engine
//!
//! Deterministic offline-sync logic for TaskFlow clients.
//!
//! This crate provides the pure core of offline-first task
//! synchronization: task records, queued mutation operations, the
//! last-modified comparator, and conflict detection/resolution. The same
//! inputs always produce the same outputs.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of storage, network, or platform
//! - **Deterministic**: conflicts are a pure function of stamps and payloads
//! - **Explicit resolution**: a conflict is never resolved automatically;
//!   the caller picks a [`Resolution`]
//!
//! ## Core Concepts
//!
//! ### Task records
//!
//! A [`TaskRecord`] is the cached entity: id, project, title, stage,
//! priority, assignee, and a server-side [`ModifiedStamp`].
//!
//! ### Operations
//!
//! Mutations made while offline (or after a failed call) are expressed as
//! [`Operation`]s - [`CreateOp`], [`UpdateOp`], [`DeleteOp`] - and queued
//! for replay. An update carries the `base_stamp` the client last saw;
//! that stamp is the optimistic-concurrency token.
//!
//! ### Conflicts
//!
//! At replay time an update conflicts exactly when the server's stamp
//! strictly supersedes the operation's base stamp ([`Conflict::detect`]).
//! Resolution strategies: accept-local, accept-server, or a shallow
//! field merge where the client wins on overlapping keys
//! ([`merge_payloads`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use taskflow_engine::{
//!     Conflict, ModifiedStamp, Operation, Priority, Stage, TaskRecord,
//! };
//! use serde_json::json;
//!
//! // The client queued an update against the state it saw at t=1000.
//! let op = Operation::update(
//!     "task-1",
//!     json!({"stage": "completed"}),
//!     ModifiedStamp::from_millis(1000),
//! );
//!
//! // At replay time the server record has moved to t=2000.
//! let server = TaskRecord::new(
//!     "task-1",
//!     "proj-1",
//!     "Write the report",
//!     Stage::InProgress,
//!     Priority::Medium,
//!     ModifiedStamp::from_millis(2000),
//! );
//!
//! let update = match &op {
//!     Operation::Update(u) => u,
//!     _ => unreachable!(),
//! };
//! let conflict = Conflict::detect(
//!     "conflict-1",
//!     1,
//!     update,
//!     &server,
//!     ModifiedStamp::from_millis(3000),
//! );
//! assert!(conflict.is_some());
//! ```

pub mod conflict;
pub mod error;
pub mod operation;
pub mod stamp;
pub mod task;

// Re-export main types at crate root
pub use conflict::{merge_payloads, Conflict, Resolution};
pub use error::Error;
pub use operation::{CreateOp, DeleteOp, Operation, UpdateOp};
pub use stamp::ModifiedStamp;
pub use task::{Priority, Stage, TaskRecord};

/// Type aliases for clarity
pub type TaskId = String;
pub type ProjectId = String;
pub type ConflictId = String;
pub type QueueId = i64;

pub use error::Result;
