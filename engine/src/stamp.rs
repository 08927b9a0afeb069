//! Last-modified stamps for optimistic concurrency.
//!
//! The stamp is the single comparator used to decide whether a server
//! record has moved past the state a client captured when it queued a
//! mutation. Keeping the comparison in one place avoids the ad-hoc
//! string/identity comparisons that plague optimistic-update code.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A last-modified stamp, in milliseconds since the Unix epoch.
///
/// Ordering rules:
/// 1. Higher milliseconds value is newer
/// 2. Equal values are considered the same write
///
/// A record only *supersedes* a base stamp when it is strictly newer;
/// an equal stamp means the client saw the current server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifiedStamp(u64);

impl ModifiedStamp {
    /// Stamp at the epoch, used for records that have never been synced.
    pub const ZERO: ModifiedStamp = ModifiedStamp(0);

    /// Create a stamp from milliseconds since the epoch.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the epoch.
    pub fn millis(&self) -> u64 {
        self.0
    }

    /// Check whether this stamp is strictly newer than a base stamp.
    ///
    /// This is the replay-time conflict test: a server record supersedes
    /// the client's captured base exactly when its stamp is strictly
    /// newer. An equal stamp is the state the client already saw.
    pub fn supersedes(&self, base: ModifiedStamp) -> bool {
        self.0 > base.0
    }

    /// Advance this stamp to be at least as recent as another.
    pub fn advance_to(&mut self, other: ModifiedStamp) {
        self.0 = self.0.max(other.0);
    }
}

impl Ord for ModifiedStamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for ModifiedStamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ModifiedStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ModifiedStamp {
    fn from(millis: u64) -> Self {
        Self(millis)
    }
}
