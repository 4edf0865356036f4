//! HTTP client for posting readings to the crowdscan ingest API.
//!
//! The async [`CrowdDataClient`] does the actual work; the emitter drives it
//! through [`BlockingCrowdDataClient`], which owns a current-thread runtime so
//! exactly one request is in flight at a time.

use crate::core::CrowdReading;
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the ingest endpoint
    pub endpoint: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a new client configuration with no request timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl From<&crate::config::Config> for ClientConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout: config.request_timeout(),
        }
    }
}

/// Errors building a client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error
    Config(String),
    /// Could not create the HTTP client or its runtime
    Init(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Config(msg) => write!(f, "Client config error: {msg}"),
            ClientError::Init(msg) => write!(f, "Client init error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmitError {
    /// Connection refused, DNS failure, timeout and the like
    Network(String),
}

impl std::fmt::Display for TransmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransmitError::Network(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TransmitError {}

/// Something that can deliver a reading and report the response status.
///
/// Any HTTP response is `Ok(status)`; deciding what counts as success is
/// left to the caller.
pub trait Transport {
    fn post(&self, reading: &CrowdReading) -> Result<u16, TransmitError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, reading: &CrowdReading) -> Result<u16, TransmitError> {
        (**self).post(reading)
    }
}

/// Async client for the ingest endpoint.
pub struct CrowdDataClient {
    config: ClientConfig,
    client: reqwest::Client,
    emitter_id: String,
}

impl CrowdDataClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let url = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| ClientError::Config(format!("Invalid endpoint '{}': {e}", config.endpoint)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "Unsupported endpoint scheme '{}'",
                url.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Init(format!("Failed to create HTTP client: {e}")))?;

        // Generate emitter ID from hostname + instance
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let emitter_id = format!(
            "emitter-{}-{}",
            hostname,
            &uuid::Uuid::new_v4().to_string()[..8]
        );

        Ok(Self {
            config,
            client,
            emitter_id,
        })
    }

    /// POST one reading and return the response status.
    pub async fn post_reading(&self, reading: &CrowdReading) -> Result<u16, TransmitError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-Emitter-Id", &self.emitter_id)
            .json(reading)
            .send()
            .await
            .map_err(|e| TransmitError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        tracing::debug!(
            status,
            location = %reading.location_id,
            gate = %reading.gate_id,
            "ingest response"
        );
        Ok(status)
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Get the emitter ID.
    pub fn emitter_id(&self) -> &str {
        &self.emitter_id
    }
}

/// Blocking client for use in the synchronous emit loop.
///
/// Must not be used from inside another tokio runtime.
pub struct BlockingCrowdDataClient {
    inner: CrowdDataClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingCrowdDataClient {
    /// Create a new blocking client.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::Init(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: CrowdDataClient::new(config)?,
            runtime,
        })
    }

    /// POST one reading and return the response status.
    pub fn post_reading(&self, reading: &CrowdReading) -> Result<u16, TransmitError> {
        self.runtime.block_on(self.inner.post_reading(reading))
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    /// Get the emitter ID.
    pub fn emitter_id(&self) -> &str {
        self.inner.emitter_id()
    }
}

impl Transport for BlockingCrowdDataClient {
    fn post(&self, reading: &CrowdReading) -> Result<u16, TransmitError> {
        self.post_reading(reading)
    }
}
