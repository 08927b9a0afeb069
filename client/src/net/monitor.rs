//! Connectivity monitoring.
//!
//! Tracks a best-effort "are we online, and is the connection usable"
//! signal. Binary online/offline transitions come from the host (the
//! platform's network events); a periodic probe request derives the
//! `slow` flag. Probe failures are swallowed and degrade the state,
//! they never reach callers.

use crate::config::SyncConfig;
use crate::error::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Latest connectivity state. Transient, held in memory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    /// Binary online flag from the platform's network stack
    pub online: bool,
    /// Probe-derived "connection is usable but degraded" flag
    pub slow: bool,
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self {
            online: true,
            slow: false,
        }
    }
}

/// Tracks online/offline transitions and probe latency, fanning the
/// state out to subscribers on every change.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<ConnectivityState>>,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor {
    /// Create a monitor, initially online and not slow.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectivityState::default());
        Self { tx: Arc::new(tx) }
    }

    /// The latest state.
    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    /// Subscribe to state changes. Emits on every transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }

    /// Host entry point for the platform's "online" transition signal.
    pub fn set_online(&self) {
        let changed = self.tx.send_if_modified(|state| {
            if state.online {
                return false;
            }
            state.online = true;
            true
        });
        if changed {
            tracing::info!("connectivity: back online");
        }
    }

    /// Host entry point for the platform's "offline" transition signal.
    pub fn set_offline(&self) {
        let changed = self.tx.send_if_modified(|state| {
            if !state.online {
                return false;
            }
            state.online = false;
            true
        });
        if changed {
            tracing::warn!("connectivity: offline");
        }
    }

    fn mark_slow(&self, slow: bool) {
        let changed = self.tx.send_if_modified(|state| {
            if state.slow == slow {
                return false;
            }
            state.slow = slow;
            true
        });
        if changed && slow {
            tracing::warn!("connectivity: connection is slow");
        }
    }

    /// Issue one probe request and fold the result into the state.
    ///
    /// Latency above `slow_threshold`, a non-success status, or any
    /// request error flags the connection slow; the binary online flag
    /// is left alone.
    pub async fn probe_once(
        &self,
        http: &reqwest::Client,
        url: &str,
        slow_threshold: Duration,
    ) {
        let started = Instant::now();
        match http.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                self.mark_slow(started.elapsed() > slow_threshold);
            }
            Ok(response) => {
                tracing::debug!(status = %response.status(), "probe returned an error status");
                self.mark_slow(true);
            }
            Err(e) => {
                tracing::debug!(error = %e, "probe failed");
                self.mark_slow(true);
            }
        }
    }

    /// Spawn the periodic probe loop. The returned handle can be
    /// aborted to stop probing; the monitor itself keeps working.
    pub fn spawn_prober(&self, config: &SyncConfig) -> Result<tokio::task::JoinHandle<()>> {
        let http = reqwest::Client::builder()
            .timeout(config.probe_timeout)
            .build()?;
        let url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.probe_path
        );
        let slow_threshold = config.slow_threshold;
        let period = config.probe_interval;
        let monitor = self.clone();

        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.probe_once(&http, &url, slow_threshold).await;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_online_and_fast() {
        let monitor = ConnectivityMonitor::new();
        assert_eq!(
            monitor.state(),
            ConnectivityState {
                online: true,
                slow: false
            }
        );
    }

    #[tokio::test]
    async fn transitions_reach_subscribers() {
        let monitor = ConnectivityMonitor::new();
        let mut rx = monitor.subscribe();

        monitor.set_offline();
        rx.changed().await.unwrap();
        assert!(!rx.borrow().online);

        monitor.set_online();
        rx.changed().await.unwrap();
        assert!(rx.borrow().online);
    }

    #[tokio::test]
    async fn repeated_transitions_do_not_emit() {
        let monitor = ConnectivityMonitor::new();
        let mut rx = monitor.subscribe();

        // Already online; no change to observe.
        monitor.set_online();
        assert!(!rx.has_changed().unwrap());

        monitor.set_offline();
        monitor.set_offline();
        rx.changed().await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn slow_flag_is_independent_of_online() {
        let monitor = ConnectivityMonitor::new();

        monitor.mark_slow(true);
        assert_eq!(
            monitor.state(),
            ConnectivityState {
                online: true,
                slow: true
            }
        );

        monitor.set_offline();
        assert_eq!(
            monitor.state(),
            ConnectivityState {
                online: false,
                slow: true
            }
        );

        monitor.mark_slow(false);
        assert!(!monitor.state().slow);
    }
}
