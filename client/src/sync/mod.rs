//! Sync module: the orchestrator and its status types.

mod orchestrator;
mod status;

pub use orchestrator::*;
pub use status::*;

use taskflow_engine::ModifiedStamp;

/// Current wall-clock time as a modified stamp.
pub(crate) fn now_stamp() -> ModifiedStamp {
    ModifiedStamp::from_millis(chrono::Utc::now().timestamp_millis().max(0) as u64)
}
