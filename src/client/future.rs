//! Execution results and the deferred-result handle

use super::pipeline::Interpreter;
use crate::error::{AwsError, AwsResult};
use crate::transport::DeferredResponse;
use serde_json::Value;

/// Interpreted outcome of one successful execution
#[derive(Debug, Clone)]
pub struct CallOutput {
    /// HTTP-style status the response arrived with
    pub status: u16,
    /// Decoded output
    pub output: Value,
}

/// Either a realized output or a handle to one still in flight.
pub enum ExecutionResult {
    Realized(CallOutput),
    Deferred(DeferredOutput),
}

impl ExecutionResult {
    /// Resolve to the final output, awaiting the deferred case.
    pub async fn resolve(self) -> AwsResult<CallOutput> {
        match self {
            ExecutionResult::Realized(output) => Ok(output),
            ExecutionResult::Deferred(mut deferred) => deferred.resolve().await,
        }
    }

    /// The deferred handle, when execution was requested non-blocking.
    pub fn deferred(self) -> Option<DeferredOutput> {
        match self {
            ExecutionResult::Deferred(deferred) => Some(deferred),
            ExecutionResult::Realized(_) => None,
        }
    }
}

enum DeferredState {
    Pending(DeferredResponse),
    Resolved(CallOutput),
    Failed(AwsError),
}

/// Handle to a result not yet available.
///
/// The first [`resolve`] awaits the underlying response and caches the
/// interpreted outcome; later calls return the cache without touching the
/// transport. [`cancel`] aborts the in-flight send; a cancel that races
/// natural completion reports `false` and the completed output stays
/// observable.
///
/// [`resolve`]: DeferredOutput::resolve
/// [`cancel`]: DeferredOutput::cancel
pub struct DeferredOutput {
    interpreter: Interpreter,
    state: DeferredState,
}

impl DeferredOutput {
    pub(crate) fn new(response: DeferredResponse, interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            state: DeferredState::Pending(response),
        }
    }

    /// Wait for the output, blocking only the calling task.
    pub async fn resolve(&mut self) -> AwsResult<CallOutput> {
        if let DeferredState::Pending(response) = &mut self.state {
            let raw = response.recv().await;
            self.state = match self.interpreter.interpret(raw) {
                Ok(output) => DeferredState::Resolved(output),
                Err(err) => DeferredState::Failed(err),
            };
        }

        match &self.state {
            DeferredState::Resolved(output) => Ok(output.clone()),
            DeferredState::Failed(err) => Err(err.clone()),
            DeferredState::Pending(_) => Err(AwsError::transport(
                self.interpreter.operation(),
                "deferred response did not settle",
            )),
        }
    }

    /// Abort the in-flight send. Returns `false` once the result has
    /// resolved (or already failed); resolving afterwards still yields the
    /// settled outcome.
    pub fn cancel(&mut self) -> bool {
        match &mut self.state {
            DeferredState::Pending(response) => response.cancel(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::pipeline::JsonErrorParser;
    use crate::error::ErrorKind;
    use crate::transport::RawResponse;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn interpreter() -> Interpreter {
        Interpreter::new("GetWidget", Arc::new(JsonErrorParser))
    }

    fn deferred_ok(status: u16, body: Value) -> DeferredOutput {
        DeferredOutput::new(
            DeferredResponse::spawn(async move { Ok(RawResponse { status, body }) }),
            interpreter(),
        )
    }

    #[tokio::test]
    async fn resolve_twice_returns_cached_output() {
        let mut deferred = deferred_ok(200, json!({"Widget": {"Id": "w-1"}}));
        let first = deferred.resolve().await.unwrap();
        let second = deferred.resolve().await.unwrap();
        assert_eq!(first.output, second.output);
        assert_eq!(first.status, 200);
    }

    #[tokio::test]
    async fn resolve_twice_returns_cached_error() {
        let mut deferred = deferred_ok(
            400,
            json!({"__type": "ThrottlingException", "message": "rate exceeded"}),
        );
        let first = deferred.resolve().await.unwrap_err();
        let second = deferred.resolve().await.unwrap_err();
        assert_eq!(first.kind(), ErrorKind::Service);
        assert_eq!(second.service_code(), Some("ThrottlingException"));
    }

    #[tokio::test]
    async fn cancel_in_flight_surfaces_transport_error() {
        let mut deferred = DeferredOutput::new(
            DeferredResponse::spawn(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(RawResponse {
                    status: 200,
                    body: Value::Null,
                })
            }),
            interpreter(),
        );
        assert!(deferred.cancel());
        let err = deferred.resolve().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        // Cancelling a settled handle is a no-op.
        assert!(!deferred.cancel());
    }

    #[tokio::test]
    async fn cancel_after_resolution_keeps_the_output() {
        let mut deferred = deferred_ok(200, json!({"ok": true}));
        let output = deferred.resolve().await.unwrap();
        assert!(!deferred.cancel());
        assert_eq!(deferred.resolve().await.unwrap().output, output.output);
    }
}
