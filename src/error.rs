//! Error taxonomy
//!
//! Every failure that escapes the execution pipeline is an [`AwsError`].
//! The [`ErrorKind`] tells callers which stage failed and whether the
//! request ever left the process; the optional service fields carry the
//! remote side's structured diagnostics when a body was parseable.

use std::fmt;
use std::sync::Arc;

/// Result alias used across the crate.
pub type AwsResult<T> = Result<T, AwsError>;

/// Failure classification, one variant per pipeline stage or engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed parameters or unknown operation/waiter name. Local, never sent.
    Validation,
    /// Credential or signing failure. Local, request not sent.
    Signing,
    /// Network-level failure. The request may or may not have reached the remote side.
    Transport,
    /// The remote side answered with a failure status.
    Service,
    /// Pagination was requested on an operation without pagination metadata.
    PaginationConfig,
    /// A waiter reached its failure state or exhausted its attempts.
    WaitFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::Signing => "signing error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Service => "service error",
            ErrorKind::PaginationConfig => "pagination config error",
            ErrorKind::WaitFailure => "wait failure",
        };
        f.write_str(name)
    }
}

/// Uniform error surfaced by the client.
///
/// Clonable so a cached deferred outcome can be handed out more than once;
/// the underlying cause is shared, not duplicated.
#[derive(Debug, Clone)]
pub struct AwsError {
    kind: ErrorKind,
    operation: String,
    message: String,
    service_code: Option<String>,
    service_type: Option<String>,
    http_status: Option<u16>,
    cause: Option<Arc<anyhow::Error>>,
}

impl AwsError {
    pub fn new(kind: ErrorKind, operation: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation: operation.to_string(),
            message: message.into(),
            service_code: None,
            service_type: None,
            http_status: None,
            cause: None,
        }
    }

    pub fn validation(operation: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, operation, message)
    }

    pub fn signing(operation: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Signing, operation, message)
    }

    pub fn transport(operation: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, operation, message)
    }

    pub fn service(operation: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Service, operation, message)
    }

    pub fn pagination_config(operation: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PaginationConfig, operation, message)
    }

    pub fn wait_failure(operation: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WaitFailure, operation, message)
    }

    /// Attach the underlying failure for diagnostics.
    pub fn with_cause<E: Into<anyhow::Error>>(mut self, cause: E) -> Self {
        self.cause = Some(Arc::new(cause.into()));
        self
    }

    /// Attach the service-reported error code and type.
    pub fn with_service(mut self, code: Option<String>, error_type: Option<String>) -> Self {
        self.service_code = code;
        self.service_type = error_type;
        self
    }

    /// Attach the HTTP status the failure arrived with.
    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Name of the operation the failing command was bound to.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn service_code(&self) -> Option<&str> {
        self.service_code.as_deref()
    }

    pub fn service_type(&self) -> Option<&str> {
        self.service_type.as_deref()
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_deref()
    }
}

impl fmt::Display for AwsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.service_code {
            Some(code) => write!(
                f,
                "{} ({}): {}: {}",
                self.kind, self.operation, code, self.message
            ),
            None => write!(f, "{} ({}): {}", self.kind, self.operation, self.message),
        }
    }
}

impl std::error::Error for AwsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(<anyhow::Error as AsRef<dyn std::error::Error + 'static>>::as_ref)
    }
}
