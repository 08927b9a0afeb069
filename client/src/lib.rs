//! # TaskFlow Client
//!
//! Offline cache, pending queue, and sync orchestration for TaskFlow
//! clients. This crate is the IO layer around [`taskflow_engine`]: a
//! durable SQLite cache of task records and user data, a durable queue
//! of mutations captured while offline, a connectivity monitor, and the
//! orchestrator that replays the queue against the remote task service
//! and surfaces version conflicts for explicit resolution.
//!
//! ## Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskflow_client::{
//!     db, spawn_on_reconnect, ConnectivityMonitor, HttpRemote, SyncConfig,
//!     SyncOrchestrator,
//! };
//!
//! # async fn wire() -> taskflow_client::Result<()> {
//! let config = SyncConfig::new("https://api.example.com").with_auth_token("token");
//!
//! let pool = db::create_pool("sqlite:taskflow.db").await?;
//! db::run_migrations(&pool).await?;
//!
//! let monitor = ConnectivityMonitor::new();
//! let _prober = monitor.spawn_prober(&config)?;
//!
//! let remote = Arc::new(HttpRemote::new(&config)?);
//! let orchestrator = Arc::new(SyncOrchestrator::new(
//!     pool,
//!     remote,
//!     monitor.clone(),
//!     config,
//! ));
//! let _resync = spawn_on_reconnect(Arc::clone(&orchestrator));
//!
//! // The host bridges its platform's network events:
//! monitor.set_offline();
//! monitor.set_online(); // triggers a sync cycle
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod net;
pub mod sync;

pub use config::{ConfigError, SyncConfig};
pub use error::{Error, Result};
pub use net::{ConnectivityMonitor, ConnectivityState, HttpRemote, TaskRemote};
pub use sync::{spawn_on_reconnect, RejectedOp, SyncOrchestrator, SyncStatus, SyncSummary};

// Re-export the engine types callers handle directly.
pub use taskflow_engine::{
    Conflict, ConflictId, ModifiedStamp, Operation, Priority, QueueId, Resolution, Stage,
    TaskRecord,
};
