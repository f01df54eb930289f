// crates/liars-dice-harness/src/client.rs
// ============================================================================
// Module: Game API Client
// Description: HTTP client for the Liar's Dice REST endpoints.
// Purpose: Issue game, claim, and challenge calls with timing and transcripts.
// Dependencies: reqwest, serde, serde_json, tokio, tracing, url
// ============================================================================

//! ## Overview
//! [`GameClient`] wraps the five game endpoints. Request bodies are sent as
//! form fields, responses are captured whole as [`ApiResponse`] so callers
//! can assert on status, body, and elapsed time. Every call is optionally
//! appended to a shared transcript that ends up in the run report.
//!
//! The client never retries: a failed call is a result the caller must see.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use reqwest::Client;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::error;
use url::Url;

use crate::config::ConfigError;
use crate::config::HarnessConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised before a server response could be captured.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The target address could not be resolved from configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Build(String),
    /// The endpoint could not be joined onto the base URL.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Endpoint path as requested.
        endpoint: String,
        /// Join failure.
        reason: String,
    },
    /// The request failed in transport (connect, timeout, body read).
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// HTTP method.
        method: String,
        /// Absolute request URL.
        url: String,
        /// Transport failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Response Capture
// ============================================================================

/// A fully read server response plus the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    /// HTTP method of the request.
    pub method: String,
    /// Final request URL.
    pub url: String,
    /// Form body sent with the request, if any.
    pub request_body: Option<String>,
    /// Request headers as sent.
    pub request_headers: Vec<(String, String)>,
    /// Response status code.
    pub status: u16,
    /// Canonical reason phrase for the status.
    pub reason: String,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body as text.
    pub body: String,
    /// Wall-clock time from send until the body was read.
    #[serde(serialize_with = "serialize_duration_ms")]
    pub elapsed: Duration,
}

impl ApiResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for 4xx and 5xx statuses.
    #[must_use]
    pub const fn is_error_status(&self) -> bool {
        self.status >= 400 && self.status < 600
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the JSON parser error when the body is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Serializes a duration as whole milliseconds.
fn serialize_duration_ms<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

/// One recorded request/response exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// Position in the transcript, starting at 1.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Request URL.
    pub url: String,
    /// Form body sent, if any.
    pub request_body: Option<String>,
    /// Response status, absent on transport failure.
    pub status: Option<u16>,
    /// Response body, absent on transport failure.
    pub response_body: Option<String>,
    /// Transport error, if any.
    pub error: Option<String>,
    /// Elapsed milliseconds for the exchange.
    pub elapsed_ms: u64,
}

// ============================================================================
// SECTION: Client Options
// ============================================================================

/// Construction options for [`GameClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Accept invalid TLS certificates.
    pub skip_ssl_verification: bool,
    /// Record every exchange in the transcript.
    pub record_transcript: bool,
}

impl ClientOptions {
    /// Derives client options from the run configuration.
    #[must_use]
    pub const fn from_config(config: &HarnessConfig) -> Self {
        Self {
            timeout: config.request_timeout,
            skip_ssl_verification: config.skip_ssl_verification,
            record_transcript: true,
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for the Liar's Dice server with transcript capture.
#[derive(Clone)]
pub struct GameClient {
    /// Server root, always ending in `/`.
    base_url: Url,
    /// Shared reqwest client.
    client: Client,
    /// Recorded exchanges when enabled.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
    /// Whether exchanges are recorded.
    record_transcript: bool,
}

impl GameClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the reqwest client cannot be built.
    pub fn new(base_url: Url, options: ClientOptions) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.skip_ssl_verification)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        Ok(Self {
            base_url,
            client,
            transcript: Arc::new(Mutex::new(Vec::new())),
            record_transcript: options.record_transcript,
        })
    }

    /// Creates a client for the server named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the server address is invalid or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, ClientError> {
        Self::new(config.connection_string()?, ClientOptions::from_config(config))
    }

    /// Returns a client sharing the connection pool but recording nothing.
    ///
    /// Load runs issue thousands of calls; their exchanges stay out of the
    /// transcript.
    #[must_use]
    pub fn without_transcript(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            transcript: Arc::new(Mutex::new(Vec::new())),
            record_transcript: false,
        }
    }

    /// Returns the server root URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Creates a new game (`POST /games`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when no response could be read.
    pub async fn new_game(&self, data: &Value) -> Result<ApiResponse, ClientError> {
        self.post("games", data).await
    }

    /// Fetches a game by id (`GET /games/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when no response could be read.
    pub async fn get_game(&self, id: &str) -> Result<ApiResponse, ClientError> {
        self.get(&format!("games/{id}")).await
    }

    /// Lists current games (`GET /games`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when no response could be read.
    pub async fn list_games(&self) -> Result<ApiResponse, ClientError> {
        self.get("games").await
    }

    /// Makes a claim in a game (`POST /games/{id}/claim`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when no response could be read.
    pub async fn claim(&self, id: &str, data: &Value) -> Result<ApiResponse, ClientError> {
        self.post(&format!("games/{id}/claim"), data).await
    }

    /// Challenges the outstanding claim (`POST /games/{id}/challenge`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when no response could be read.
    pub async fn challenge(&self, id: &str, data: &Value) -> Result<ApiResponse, ClientError> {
        self.post(&format!("games/{id}/challenge"), data).await
    }

    /// Returns true when the landing page answers with a success status.
    pub async fn site_available(&self) -> bool {
        match self.get("").await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                error!(
                    url = %response.url,
                    status = response.status,
                    "landing page returned an error status"
                );
                false
            }
            Err(err) => {
                error!(error = %err, "landing page unreachable");
                false
            }
        }
    }

    /// Issues a GET request.
    async fn get(&self, endpoint: &str) -> Result<ApiResponse, ClientError> {
        self.send(Method::GET, endpoint, None).await
    }

    /// Issues a POST request with a form body.
    async fn post(&self, endpoint: &str, data: &Value) -> Result<ApiResponse, ClientError> {
        self.send(Method::POST, endpoint, Some(data)).await
    }

    /// Sends one request and reads the full response.
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<&Value>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.base_url.join(endpoint).map_err(|err| ClientError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        let request_body = data.map(ToString::to_string);
        debug!(
            method = %method,
            url = %url,
            data = request_body.as_deref().unwrap_or(""),
            "sending request"
        );
        let transport_error = |reason: String| ClientError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            reason,
        };

        let mut builder = self.client.request(method.clone(), url.clone());
        if let Some(data) = data {
            builder = builder.form(data);
        }
        let request = builder.build().map_err(|err| transport_error(err.to_string()))?;
        let request_headers = header_pairs(request.headers());

        let started = Instant::now();
        let outcome = match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                let headers = header_pairs(response.headers());
                let final_url = response.url().to_string();
                response.text().await.map(|body| (status, headers, final_url, body))
            }
            Err(err) => Err(err),
        };
        let elapsed = started.elapsed();

        match outcome {
            Ok((status, headers, final_url, body)) => {
                let response = ApiResponse {
                    method: method.to_string(),
                    url: final_url,
                    request_body,
                    request_headers,
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                    headers,
                    body,
                    elapsed,
                };
                self.record(TranscriptEntry {
                    sequence: 0,
                    method: response.method.clone(),
                    url: response.url.clone(),
                    request_body: response.request_body.clone(),
                    status: Some(response.status),
                    response_body: Some(response.body.clone()),
                    error: None,
                    elapsed_ms: duration_ms(elapsed),
                });
                Ok(response)
            }
            Err(err) => {
                self.record(TranscriptEntry {
                    sequence: 0,
                    method: method.to_string(),
                    url: url.to_string(),
                    request_body,
                    status: None,
                    response_body: None,
                    error: Some(err.to_string()),
                    elapsed_ms: duration_ms(elapsed),
                });
                Err(transport_error(err.to_string()))
            }
        }
    }

    /// Appends an entry to the transcript when recording is enabled.
    fn record(&self, mut entry: TranscriptEntry) {
        if !self.record_transcript {
            return;
        }
        let Ok(mut guard) = self.transcript.lock() else {
            return;
        };
        entry.sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(entry);
    }
}

/// Flattens a header map into printable pairs.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (name.to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
        })
        .collect()
}

/// Converts a duration to whole milliseconds, saturating.
pub(crate) fn duration_ms(value: Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}
