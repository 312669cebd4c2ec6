//! Waiters - poll an operation until a model-declared condition settles
//!
//! Each attempt executes the configured operation and evaluates the
//! waiter's acceptors in declared order against the outcome; the first
//! match decides the attempt. Transport and service errors are observable
//! outcomes like any other, not early aborts. Dropping the wait future
//! stops further attempts from being scheduled.

use super::future::CallOutput;
use super::Client;
use crate::error::{AwsError, AwsResult};
use crate::model::paths::{resolve, resolve_collection};
use crate::model::{Acceptor, AcceptorState, Matcher, WaiterConfig};
use serde_json::Value;
use std::time::Duration;

/// Successful wait: how many attempts it took and, when the accepting
/// match was on a response rather than an error, the final output.
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    pub attempts: u32,
    pub output: Option<CallOutput>,
}

pub(crate) async fn run(
    client: &Client,
    waiter_name: &str,
    operation: &str,
    config: &WaiterConfig,
    parameters: Value,
) -> AwsResult<WaitOutcome> {
    let target = config.operation.as_deref().unwrap_or(operation);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        tracing::debug!(waiter = waiter_name, attempt = attempts, "polling {target}");

        let outcome = client.call(target, parameters.clone()).await;
        let verdict = evaluate(&config.acceptors, &outcome);

        match verdict {
            Some(AcceptorState::Success) => {
                return Ok(WaitOutcome {
                    attempts,
                    output: outcome.ok(),
                });
            }
            Some(AcceptorState::Failure) => {
                let mut err = AwsError::wait_failure(
                    operation,
                    format!(
                        "waiter {waiter_name} transitioned to failure after {attempts} attempt(s)"
                    ),
                );
                if let Err(cause) = outcome {
                    err = err.with_cause(cause);
                }
                return Err(err);
            }
            Some(AcceptorState::Retry) | None => {
                if attempts >= config.max_attempts {
                    return Err(AwsError::wait_failure(
                        operation,
                        format!(
                            "waiter {waiter_name} exceeded max attempts ({})",
                            config.max_attempts
                        ),
                    ));
                }
                tokio::time::sleep(Duration::from_secs(config.delay_seconds)).await;
            }
        }
    }
}

/// First acceptor whose matcher holds decides the attempt.
fn evaluate(acceptors: &[Acceptor], outcome: &AwsResult<CallOutput>) -> Option<AcceptorState> {
    acceptors
        .iter()
        .find(|acceptor| matches(acceptor, outcome))
        .map(|acceptor| acceptor.state)
}

fn matches(acceptor: &Acceptor, outcome: &AwsResult<CallOutput>) -> bool {
    match acceptor.matcher {
        Matcher::Status => {
            let status = match outcome {
                Ok(output) => Some(output.status),
                Err(err) => err.http_status(),
            };
            match (status, acceptor.expected.as_u64()) {
                (Some(actual), Some(expected)) => u64::from(actual) == expected,
                _ => false,
            }
        }
        Matcher::Error => match outcome {
            Err(err) => match &acceptor.expected {
                // Model shorthand: `true` matches any normalized error.
                Value::Bool(any) => *any,
                Value::String(code) => err.service_code() == Some(code.as_str()),
                _ => false,
            },
            Ok(_) => acceptor.expected == Value::Bool(false),
        },
        Matcher::Path => {
            let (Ok(output), Some(argument)) = (outcome, acceptor.argument.as_deref()) else {
                return false;
            };
            resolve(&output.output, argument) == Some(&acceptor.expected)
        }
        Matcher::PathAny | Matcher::PathAll => {
            let (Ok(output), Some(argument)) = (outcome, acceptor.argument.as_deref()) else {
                return false;
            };
            let collection = collection_at(&output.output, argument);
            if collection.is_empty() {
                return false;
            }
            match acceptor.matcher {
                Matcher::PathAny => collection.iter().any(|v| *v == acceptor.expected),
                _ => collection.iter().all(|v| *v == acceptor.expected),
            }
        }
    }
}

/// Resolve an argument that should name a collection; a path landing on a
/// single array compares element-wise.
fn collection_at(output: &Value, argument: &str) -> Vec<Value> {
    let mut collection = resolve_collection(output, argument);
    if collection.len() == 1 {
        if let Value::Array(elements) = &collection[0] {
            collection = elements.clone();
        }
    }
    collection
}
