//! Execution pipeline - serialize, sign, send, interpret
//!
//! Every failure leaving this module is normalized into [`AwsError`]
//! exactly once, at the stage where it surfaced. Errors that are already
//! normalized (results of nested executions) pass through untouched.

use super::command::Command;
use super::future::{CallOutput, DeferredOutput, ExecutionResult};
use crate::error::{AwsError, AwsResult};
use crate::transport::{
    Dispatch, ErrorParser, ParsedError, ProvideCredentials, RawResponse, Request,
    SerializationError, Serializer, Signer, Transport, TransportError,
};
use serde_json::Value;
use std::sync::Arc;

/// Shared collaborator bundle; per-call state never lives here.
pub(crate) struct Handlers {
    pub serializer: Arc<dyn Serializer>,
    pub signer: Arc<dyn Signer>,
    pub credentials: Arc<dyn ProvideCredentials>,
    pub transport: Arc<dyn Transport>,
    pub error_parser: Arc<dyn ErrorParser>,
}

/// Drive one command through the pipeline.
pub(crate) async fn execute(handlers: &Handlers, command: &Command) -> AwsResult<ExecutionResult> {
    let operation = command.operation_name();

    let mut request = handlers.serializer.serialize(command).map_err(|e| {
        AwsError::validation(operation, e.to_string()).with_cause(e)
    })?;

    let credentials = handlers.credentials.credentials().await.map_err(|e| {
        AwsError::signing(operation, format!("failed to obtain credentials: {e}")).with_cause(e)
    })?;

    handlers
        .signer
        .sign(&mut request, &credentials)
        .map_err(|e| AwsError::signing(operation, e.to_string()).with_cause(e))?;

    let interpreter = Interpreter::new(operation, Arc::clone(&handlers.error_parser));

    let dispatch = handlers
        .transport
        .send(request, command.is_deferred())
        .await
        .map_err(|e| interpreter.transport_error(e))?;

    match dispatch {
        Dispatch::Response(raw) => {
            let output = interpreter.interpret(Ok(raw))?;
            Ok(ExecutionResult::Realized(output))
        }
        Dispatch::Deferred(response) => {
            Ok(ExecutionResult::Deferred(DeferredOutput::new(
                response,
                interpreter,
            )))
        }
    }
}

/// Response interpretation, shared between the inline path and deferred
/// handles resolving later.
pub(crate) struct Interpreter {
    operation: String,
    error_parser: Arc<dyn ErrorParser>,
}

impl Interpreter {
    pub(crate) fn new(operation: &str, error_parser: Arc<dyn ErrorParser>) -> Self {
        Self {
            operation: operation.to_string(),
            error_parser,
        }
    }

    pub(crate) fn operation(&self) -> &str {
        &self.operation
    }

    pub(crate) fn interpret(
        &self,
        outcome: Result<RawResponse, TransportError>,
    ) -> AwsResult<CallOutput> {
        match outcome {
            Ok(raw) if (200..300).contains(&raw.status) => Ok(CallOutput {
                status: raw.status,
                output: raw.body,
            }),
            Ok(raw) => Err(self.service_error(raw)),
            Err(err) => Err(self.transport_error(err)),
        }
    }

    fn service_error(&self, raw: RawResponse) -> AwsError {
        match self.error_parser.parse(raw.status, &raw.body) {
            Some(parsed) => {
                let message = parsed
                    .message
                    .unwrap_or_else(|| format!("service returned status {}", raw.status));
                AwsError::service(&self.operation, message)
                    .with_service(parsed.code, parsed.error_type)
                    .with_status(raw.status)
            }
            None => {
                AwsError::service(
                    &self.operation,
                    format!("service returned status {}", raw.status),
                )
                .with_status(raw.status)
            }
        }
    }

    pub(crate) fn transport_error(&self, err: TransportError) -> AwsError {
        AwsError::transport(&self.operation, err.to_string()).with_cause(err)
    }
}

/// Default serializer: maps the operation's HTTP route to a JSON request.
///
/// GET routes carry parameters in the query string; everything else sends
/// the parameter object as a JSON body.
#[derive(Debug, Clone, Default)]
pub struct RestJsonSerializer;

impl Serializer for RestJsonSerializer {
    fn serialize(&self, command: &Command) -> Result<Request, SerializationError> {
        let model = command.model();
        let Some(params) = command.parameters().as_object() else {
            return Err(SerializationError::InvalidParameters(model.name.clone()));
        };

        let mut request = Request::new(&model.http.method, &model.http.request_uri);
        request.set_header("accept", "application/json");

        if model.http.method.eq_ignore_ascii_case("GET") {
            for (key, value) in params {
                match value {
                    Value::String(s) => request.query.push((key.clone(), s.clone())),
                    Value::Number(n) => request.query.push((key.clone(), n.to_string())),
                    Value::Bool(b) => request.query.push((key.clone(), b.to_string())),
                    Value::Array(items) => {
                        for item in items {
                            let Some(s) = item.as_str() else {
                                return Err(SerializationError::UnsupportedValue(key.clone()));
                            };
                            request.query.push((key.clone(), s.to_string()));
                        }
                    }
                    Value::Null => {}
                    Value::Object(_) => {
                        return Err(SerializationError::UnsupportedValue(key.clone()));
                    }
                }
            }
        } else {
            request.set_header("content-type", "application/json");
            request.body = Some(command.parameters().clone());
        }

        Ok(request)
    }
}

/// Best-effort parser for the common structured error body shapes.
#[derive(Debug, Clone, Default)]
pub struct JsonErrorParser;

fn field<'a>(obj: &'a serde_json::Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

fn string_field(obj: &serde_json::Map<String, Value>, names: &[&str]) -> Option<String> {
    field(obj, names).and_then(Value::as_str).map(str::to_string)
}

impl ErrorParser for JsonErrorParser {
    fn parse(&self, _status: u16, body: &Value) -> Option<ParsedError> {
        let obj = body.as_object()?;

        // AWS json-protocol shape: {"__type": "ns#Code", "message": "..."}
        if let Some(type_field) = obj.get("__type").and_then(Value::as_str) {
            let code = type_field
                .rsplit('#')
                .next()
                .unwrap_or(type_field)
                .to_string();
            return Some(ParsedError {
                code: Some(code),
                error_type: string_field(obj, &["type", "Type"]),
                message: string_field(obj, &["message", "Message"]),
            });
        }

        // Flat shape: {"code": "...", "message": "...", "type": "..."}
        if field(obj, &["code", "Code"]).is_some() {
            return Some(ParsedError {
                code: string_field(obj, &["code", "Code"]),
                error_type: string_field(obj, &["type", "Type"]),
                message: string_field(obj, &["message", "Message"]),
            });
        }

        // Nested shape: {"error": {"code": ..., "message": ..., "status": ...}}
        if let Some(nested) = field(obj, &["error", "Error"]).and_then(Value::as_object) {
            return Some(ParsedError {
                code: string_field(nested, &["code", "Code"]).or_else(|| {
                    field(nested, &["code", "Code"]).map(|v| v.to_string())
                }),
                error_type: string_field(nested, &["type", "Type", "status"]),
                message: string_field(nested, &["message", "Message"]),
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::ServiceModel;
    use serde_json::json;

    fn command(method: &str, params: Value) -> Command {
        let model = ServiceModel::from_json(&format!(
            r#"{{"operations": {{"TestOp": {{"http": {{"method": "{method}", "requestUri": "/test"}}}}}}}}"#
        ))
        .unwrap();
        Command::new(
            std::sync::Arc::clone(model.operation("TestOp").unwrap()),
            params,
            Default::default(),
        )
        .unwrap()
    }

    #[test]
    fn get_routes_serialize_into_the_query_string() {
        let request = RestJsonSerializer
            .serialize(&command(
                "GET",
                json!({"Name": "w-1", "MaxResults": 5, "Tags": ["a", "b"]}),
            ))
            .unwrap();
        assert_eq!(request.method, "GET");
        assert!(request.body.is_none());
        assert!(request.query.contains(&("Name".to_string(), "w-1".to_string())));
        assert!(request.query.contains(&("MaxResults".to_string(), "5".to_string())));
        assert!(request.query.contains(&("Tags".to_string(), "b".to_string())));
    }

    #[test]
    fn post_routes_serialize_into_a_json_body() {
        let request = RestJsonSerializer
            .serialize(&command("POST", json!({"Name": "w-1"})))
            .unwrap();
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body, Some(json!({"Name": "w-1"})));
    }

    #[test]
    fn nested_objects_cannot_ride_a_query_string() {
        let err = RestJsonSerializer
            .serialize(&command("GET", json!({"Filter": {"a": 1}})))
            .unwrap_err();
        assert!(matches!(err, SerializationError::UnsupportedValue(_)));
    }

    #[test]
    fn interpreter_passes_success_through() {
        let interpreter = Interpreter::new("TestOp", std::sync::Arc::new(JsonErrorParser));
        let output = interpreter
            .interpret(Ok(RawResponse {
                status: 201,
                body: json!({"Id": "w-1"}),
            }))
            .unwrap();
        assert_eq!(output.status, 201);
        assert_eq!(output.output["Id"], "w-1");
    }

    #[test]
    fn structured_failure_becomes_a_service_error() {
        let interpreter = Interpreter::new("TestOp", std::sync::Arc::new(JsonErrorParser));
        let err = interpreter
            .interpret(Ok(RawResponse {
                status: 400,
                body: json!({"__type": "aws.api#ThrottlingException", "message": "rate exceeded"}),
            }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.service_code(), Some("ThrottlingException"));
        assert_eq!(err.message(), "rate exceeded");
        assert_eq!(err.http_status(), Some(400));
    }

    #[test]
    fn unstructured_failure_still_carries_the_status() {
        let interpreter = Interpreter::new("TestOp", std::sync::Arc::new(JsonErrorParser));
        let err = interpreter
            .interpret(Ok(RawResponse {
                status: 503,
                body: Value::String("upstream unavailable".to_string()),
            }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.service_code(), None);
        assert_eq!(err.http_status(), Some(503));
    }

    #[test]
    fn network_failure_becomes_a_transport_error() {
        let interpreter = Interpreter::new("TestOp", std::sync::Arc::new(JsonErrorParser));
        let err = interpreter
            .interpret(Err(TransportError::Send("connection reset".to_string())))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.cause().is_some());
    }

    #[test]
    fn error_parser_reads_nested_shapes() {
        let parsed = JsonErrorParser
            .parse(403, &json!({"error": {"code": 403, "message": "denied"}}))
            .unwrap();
        assert_eq!(parsed.code.as_deref(), Some("403"));
        assert_eq!(parsed.message.as_deref(), Some("denied"));

        assert!(JsonErrorParser.parse(500, &json!("plain text")).is_none());
    }
}
