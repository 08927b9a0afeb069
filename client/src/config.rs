//! Configuration for the sync client.

use std::env;
use std::time::Duration;

/// Client configuration. Built in code or loaded from environment
/// variables; the auth token is plain injected configuration, never
/// looked up through an ambient helper.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the remote task service (e.g. `https://api.example.com`)
    pub base_url: String,
    /// Bearer token sent with every request, if the service requires one
    pub auth_token: Option<String>,
    /// Path probed for connectivity checks
    pub probe_path: String,
    /// How often the connectivity probe runs
    pub probe_interval: Duration,
    /// Timeout for a single probe request
    pub probe_timeout: Duration,
    /// Probe latency above this flags the connection as slow
    pub slow_threshold: Duration,
    /// Timeout for replay calls (fetch/create/update/delete)
    pub replay_timeout: Duration,
    /// Optional age after which an unresolved conflict expires as
    /// accept-server. `None` means conflicts wait indefinitely for an
    /// explicit resolution.
    pub conflict_ttl: Option<Duration>,
}

impl SyncConfig {
    /// Create a configuration with default tuning for the given service.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            probe_path: "/health".to_string(),
            probe_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            slow_threshold: Duration::from_secs(2),
            replay_timeout: Duration::from_secs(20),
            conflict_ttl: None,
        }
    }

    /// Set the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the conflict TTL.
    pub fn with_conflict_ttl(mut self, ttl: Duration) -> Self {
        self.conflict_ttl = Some(ttl);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("TASKFLOW_BASE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;

        let mut config = Self::new(base_url);
        config.auth_token = env::var("TASKFLOW_AUTH_TOKEN").ok();

        if let Some(secs) = read_secs("TASKFLOW_PROBE_INTERVAL_SECS")? {
            config.probe_interval = secs;
        }
        if let Some(secs) = read_secs("TASKFLOW_PROBE_TIMEOUT_SECS")? {
            config.probe_timeout = secs;
        }
        if let Some(secs) = read_secs("TASKFLOW_SLOW_THRESHOLD_SECS")? {
            config.slow_threshold = secs;
        }
        if let Some(secs) = read_secs("TASKFLOW_REPLAY_TIMEOUT_SECS")? {
            config.replay_timeout = secs;
        }
        config.conflict_ttl = read_secs("TASKFLOW_CONFLICT_TTL_SECS")?;

        Ok(config)
    }
}

fn read_secs(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(var) {
        Ok(value) => {
            let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidDuration(var))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TASKFLOW_BASE_URL environment variable is required")]
    MissingBaseUrl,

    #[error("Invalid duration in {0}")]
    InvalidDuration(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::new("http://localhost:3000");
        assert_eq!(config.probe_interval, Duration::from_secs(30));
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.slow_threshold, Duration::from_secs(2));
        assert_eq!(config.replay_timeout, Duration::from_secs(20));
        assert!(config.auth_token.is_none());
        assert!(config.conflict_ttl.is_none());
    }

    #[test]
    fn builder_methods() {
        let config = SyncConfig::new("http://localhost:3000")
            .with_auth_token("secret")
            .with_conflict_ttl(Duration::from_secs(3600));

        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.conflict_ttl, Some(Duration::from_secs(3600)));
    }
}
