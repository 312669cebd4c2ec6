//! Transport seam
//!
//! The execution pipeline drives its collaborators through the traits in
//! this module: a [`Serializer`] turns a command into a [`Request`], a
//! [`Signer`] augments it with credentials from a [`ProvideCredentials`],
//! a [`Transport`] carries it to the remote side, and an [`ErrorParser`]
//! extracts structured diagnostics from failure bodies. The pipeline owns
//! none of this logic; each collaborator is replaceable per client.
//!
//! # Module Structure
//!
//! - [`auth`] - Credentials, caching provider, and the default token signer
//! - [`http`] - Default JSON-over-HTTP transport on reqwest

pub mod auth;
pub mod http;

use crate::client::Command;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;

pub use auth::{CachingProvider, Credentials, StaticCredentials, TokenSigner};
pub use http::HttpTransport;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    #[error("parameters for {0} must be a JSON object")]
    InvalidParameters(String),
    #[error("parameter {0} cannot be encoded into a query string")]
    UnsupportedValue(String),
}

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("credentials rejected: {0}")]
    Credentials(String),
    #[error("request cannot be signed: {0}")]
    Unsignable(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("malformed request: {0}")]
    InvalidRequest(String),
    #[error("failed to send request: {0}")]
    Send(String),
    #[error("failed to read response body: {0}")]
    InvalidResponse(String),
    #[error("request was cancelled")]
    Cancelled,
    #[error("background send failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("no credentials available: {0}")]
    NotFound(String),
    #[error("credentials expired")]
    Expired,
    #[error("credential provider failure: {0}")]
    Provider(String),
}

/// Transport-ready request, produced by a serializer and mutated by a signer.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// Set a header, replacing any existing value. Names are matched
    /// case-insensitively.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_ascii_lowercase(), value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw transport-level response: status plus decoded JSON body.
///
/// Non-success statuses are still responses; classifying them is the
/// pipeline's job, not the transport's.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// The transport's answer to a send.
pub enum Dispatch {
    /// The response arrived inline.
    Response(RawResponse),
    /// The send is still in flight; resolve it through the handle.
    Deferred(DeferredResponse),
}

/// Handle to a response still in flight on a background task.
pub struct DeferredResponse {
    handle: JoinHandle<Result<RawResponse, TransportError>>,
}

impl DeferredResponse {
    /// Run a send on a background task and hand back the handle.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: std::future::Future<Output = Result<RawResponse, TransportError>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(fut),
        }
    }

    /// Abort the in-flight send. Returns `false` when the response already
    /// resolved; the resolved response stays observable through [`recv`].
    ///
    /// [`recv`]: DeferredResponse::recv
    pub fn cancel(&mut self) -> bool {
        if self.handle.is_finished() {
            return false;
        }
        self.handle.abort();
        true
    }

    /// Wait for the underlying send to settle. Must be called at most once.
    pub async fn recv(&mut self) -> Result<RawResponse, TransportError> {
        match (&mut self.handle).await {
            Ok(outcome) => outcome,
            Err(join) if join.is_cancelled() => Err(TransportError::Cancelled),
            Err(join) => Err(TransportError::Worker(join.to_string())),
        }
    }
}

/// Serializes a command into a transport-ready request.
pub trait Serializer: Send + Sync {
    fn serialize(&self, command: &Command) -> Result<Request, SerializationError>;
}

/// Signs a request in place using held credentials.
pub trait Signer: Send + Sync {
    fn sign(&self, request: &mut Request, credentials: &Credentials) -> Result<(), SigningError>;
}

/// Carries a signed request to the remote side.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request. When `deferred` is set and the transport supports
    /// non-blocking sends, the result is a [`Dispatch::Deferred`] handle.
    async fn send(&self, request: Request, deferred: bool) -> Result<Dispatch, TransportError>;
}

/// Service-reported diagnostics extracted from a failure body.
#[derive(Debug, Clone, Default)]
pub struct ParsedError {
    pub code: Option<String>,
    pub error_type: Option<String>,
    pub message: Option<String>,
}

/// Best-effort extraction of structured error bodies.
pub trait ErrorParser: Send + Sync {
    /// Returns `None` when the body carries no recognizable structure;
    /// that is not itself an error.
    fn parse(&self, status: u16, body: &Value) -> Option<ParsedError>;
}

/// Yields credentials for signing.
#[async_trait]
pub trait ProvideCredentials: Send + Sync {
    async fn credentials(&self) -> Result<Credentials, CredentialsError>;
}
