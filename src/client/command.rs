//! Commands - bound, executable invocations of an operation

use crate::error::{AwsError, AwsResult};
use crate::model::OperationModel;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Call-time options
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    /// Request a non-blocking send; `execute` then returns a deferred handle.
    pub deferred: bool,
}

impl CallOptions {
    /// Options for a deferred execution.
    pub fn deferred() -> Self {
        Self { deferred: true }
    }
}

/// One operation bound to concrete parameters, immutable once built.
///
/// Holds a shared reference into the service model, not a copy; commands
/// are created per call and discarded after execution.
#[derive(Clone)]
pub struct Command {
    model: Arc<OperationModel>,
    parameters: Value,
    options: CallOptions,
}

impl Command {
    pub(crate) fn new(
        model: Arc<OperationModel>,
        parameters: Value,
        options: CallOptions,
    ) -> AwsResult<Self> {
        let parameters = match parameters {
            Value::Null => Value::Object(serde_json::Map::new()),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(AwsError::validation(
                    &model.name,
                    format!("parameters must be a JSON object, got {}", type_name(&other)),
                ));
            }
        };

        Ok(Self {
            model,
            parameters,
            options,
        })
    }

    pub fn operation_name(&self) -> &str {
        &self.model.name
    }

    pub fn model(&self) -> &OperationModel {
        &self.model
    }

    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn options(&self) -> CallOptions {
        self.options
    }

    pub fn is_deferred(&self) -> bool {
        self.options.deferred
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("operation", &self.model.name)
            .field("parameters", &self.parameters)
            .field("deferred", &self.options.deferred)
            .finish()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn model(name: &str) -> Arc<OperationModel> {
        let service = crate::model::ServiceModel::from_json(&format!(
            r#"{{"operations": {{"{name}": {{}}}}}}"#
        ))
        .unwrap();
        Arc::clone(service.operation(name).unwrap())
    }

    #[test]
    fn null_parameters_normalize_to_empty_object() {
        let command = Command::new(model("GetWidget"), Value::Null, CallOptions::default()).unwrap();
        assert_eq!(command.parameters(), &json!({}));
        assert_eq!(command.operation_name(), "GetWidget");
    }

    #[test]
    fn non_object_parameters_are_rejected() {
        let err =
            Command::new(model("GetWidget"), json!([1, 2]), CallOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("array"));
    }

    #[test]
    fn deferred_option_is_carried() {
        let command = Command::new(model("GetWidget"), json!({}), CallOptions::deferred()).unwrap();
        assert!(command.is_deferred());
    }
}
