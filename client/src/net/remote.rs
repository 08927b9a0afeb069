//! HTTP transport for the remote task service.
//!
//! The orchestrator talks to the service through the [`TaskRemote`]
//! trait so tests (and alternative transports) can be injected; the
//! production implementation is [`HttpRemote`] over `reqwest`.

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use taskflow_engine::TaskRecord;

/// The remote task service, as consumed by the sync layer.
#[async_trait]
pub trait TaskRemote: Send + Sync {
    /// Fetch the current server state of a task. `None` when the task
    /// does not exist server-side.
    async fn fetch(&self, id: &str) -> Result<Option<TaskRecord>>;

    /// Create a task; returns the record as stored by the server.
    async fn create(&self, task: &TaskRecord) -> Result<TaskRecord>;

    /// Update a task with a partial payload; returns the stored record.
    async fn update(&self, id: &str, payload: &serde_json::Value) -> Result<TaskRecord>;

    /// Delete a task. Deleting an already-deleted task succeeds.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// JSON envelope returned by the task service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    status: bool,
    #[serde(default)]
    task: Option<TaskRecord>,
    #[serde(default)]
    message: Option<String>,
}

/// `TaskRemote` implementation over HTTP.
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRemote {
    /// Build a transport from the client configuration.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.replay_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request.send().await.map_err(classify_send_error)
    }

    async fn read_task(&self, response: reqwest::Response) -> Result<TaskRecord> {
        let envelope: Envelope = response.json().await?;
        if !envelope.status {
            return Err(Error::BadEnvelope(
                envelope
                    .message
                    .unwrap_or_else(|| "service reported failure without a message".to_string()),
            ));
        }
        envelope
            .task
            .ok_or_else(|| Error::BadEnvelope("missing task in response".to_string()))
    }
}

/// Network-level failures (offline, timeout) are retried on a later
/// cycle; everything else bubbles as an HTTP error.
fn classify_send_error(e: reqwest::Error) -> Error {
    if e.is_timeout() || e.is_connect() {
        Error::Unreachable(e.to_string())
    } else {
        Error::Http(e)
    }
}

async fn reject(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Error::Rejected { status, message }
}

#[async_trait]
impl TaskRemote for HttpRemote {
    async fn fetch(&self, id: &str) -> Result<Option<TaskRecord>> {
        let response = self
            .send(self.request(reqwest::Method::GET, &format!("/tasks/{id}")))
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        self.read_task(response).await.map(Some)
    }

    async fn create(&self, task: &TaskRecord) -> Result<TaskRecord> {
        let response = self
            .send(self.request(reqwest::Method::POST, "/tasks").json(task))
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        self.read_task(response).await
    }

    async fn update(&self, id: &str, payload: &serde_json::Value) -> Result<TaskRecord> {
        let response = self
            .send(
                self.request(reqwest::Method::PUT, &format!("/tasks/{id}"))
                    .json(payload),
            )
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        self.read_task(response).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .send(self.request(reqwest::Method::DELETE, &format!("/tasks/{id}")))
            .await?;

        // Already gone counts as done.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        Ok(())
    }
}
