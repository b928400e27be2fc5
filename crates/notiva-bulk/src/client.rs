//! HTTP transport for bulk dispatch.
//!
//! One [`ApiClient`] wraps a pooled `reqwest` client; distinct bulk
//! operations may share it or build their own without changing pipeline
//! semantics. The client performs exactly one POST per call and reports
//! non-2xx statuses as ordinary responses; only transport-level failures
//! (timeout, connection error) surface as [`TransportError`].

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use notiva_core::Config;
use thiserror::Error;
use tracing::debug;

use crate::error::BulkError;

const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
const MAX_REDIRECTS: usize = 3;

/// Transport-level failure of one outbound call.
///
/// These never escape chunk dispatch; the chunk converts them into an
/// all-fail outcome carrying the error message.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// HTTP request timeout exceeded.
    #[error("request timeout after {timeout_seconds}s")]
    Timeout {
        /// Number of seconds before the request timed out.
        timeout_seconds: u64,
    },

    /// Network-level connectivity failure.
    #[error("network connection failed: {message}")]
    Network {
        /// Error message describing the network failure.
        message: String,
    },

    /// Any other request failure.
    #[error("request failed: {message}")]
    Request {
        /// Error message from the HTTP stack.
        message: String,
    },
}

/// Response from one outbound API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Whether the status was 2xx.
    pub is_success: bool,
    /// Response body text.
    pub body: String,
}

/// Request material handed to the signing collaborator.
#[derive(Debug, Clone, Copy)]
pub struct SignRequest<'a> {
    /// HTTP method, uppercase.
    pub method: &'a str,
    /// Request path relative to the base URL.
    pub path: &'a str,
    /// Serialized request body. Implementations must treat the body of a
    /// GET request as empty when computing the content digest.
    pub body: &'a str,
    /// `Content-Type` header value.
    pub content_type: &'a str,
    /// RFC 7231 `Date` header value.
    pub date: &'a str,
}

/// The request-signing collaborator's contract.
///
/// Producing the signature scheme itself is out of scope for this crate;
/// callers supply an implementation and the client prepends the workspace
/// key to whatever it returns as `Authorization: <key>:<signature>`.
pub trait RequestSigner: Send + Sync {
    /// Returns the base64 signature for the request, or `None` to send the
    /// request unsigned.
    fn signature(&self, request: &SignRequest<'_>) -> Option<String>;
}

/// Signer that leaves every request unsigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSigner;

impl RequestSigner for NoopSigner {
    fn signature(&self, _request: &SignRequest<'_>) -> Option<String> {
        None
    }
}

/// HTTP client for the platform's ingestion API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    workspace_key: String,
    timeout_seconds: u64,
    signer: Arc<dyn RequestSigner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client from workspace configuration and a signer.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::Configuration`] if the HTTP client cannot be
    /// built with the configured settings.
    pub fn new(config: &Config, signer: Arc<dyn RequestSigner>) -> Result<Self, BulkError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| BulkError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            workspace_key: config.workspace_key.clone(),
            timeout_seconds: config.request_timeout_seconds,
            signer,
        })
    }

    /// Creates an unsigned client from workspace configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::Configuration`] if the HTTP client cannot be
    /// built with the configured settings.
    pub fn unsigned(config: &Config) -> Result<Self, BulkError> {
        Self::new(config, Arc::new(NoopSigner))
    }

    /// Sends one JSON POST to the given API path.
    ///
    /// Non-2xx statuses are ordinary responses here; callers decide what
    /// they mean.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] for timeouts, connection failures, and
    /// other request-level faults.
    pub async fn post(&self, path: &str, body: String) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

        let mut request = self
            .http
            .post(&url)
            .header("content-type", CONTENT_TYPE_JSON)
            .header("date", &date);

        let sign_request = SignRequest {
            method: "POST",
            path,
            body: &body,
            content_type: CONTENT_TYPE_JSON,
            date: &date,
        };
        if let Some(signature) = self.signer.signature(&sign_request) {
            request =
                request.header("authorization", format!("{}:{signature}", self.workspace_key));
        }

        debug!(url = %url, body_bytes = body.len(), "sending bulk request");

        let response = match request.body(body).send().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    return Err(TransportError::Timeout {
                        timeout_seconds: self.timeout_seconds,
                    });
                }
                if e.is_connect() {
                    return Err(TransportError::Network {
                        message: format!("connection failed: {e}"),
                    });
                }
                return Err(TransportError::Request { message: e.to_string() });
            },
        };

        let status_code = response.status().as_u16();
        let is_success = response.status().is_success();
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => format!("[failed to read response body: {e}]"),
        };

        debug!(status = status_code, "received bulk response");

        Ok(ApiResponse { status_code, is_success, body })
    }
}
