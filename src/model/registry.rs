//! Service model registry - load operation definitions from JSON
//!
//! Model data describes each callable operation: its HTTP route, input and
//! output shapes, an optional pagination table, and named waiters. The
//! registry is parsed once at client construction and handed out as shared
//! read-only references.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("operation {0}: pagination table has no output token")]
    MissingOutputToken(String),
}

/// Model data writes token fields as either a single string or a list.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// Shape reference from model data
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeRef {
    pub shape: String,
}

/// HTTP route for an operation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRoute {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_request_uri")]
    pub request_uri: String,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_request_uri() -> String {
    "/".to_string()
}

impl Default for HttpRoute {
    fn default() -> Self {
        Self {
            method: default_method(),
            request_uri: default_request_uri(),
        }
    }
}

/// Pagination descriptor for a list-type operation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Parameter name(s) carrying the continuation cursor on the next call
    #[serde(default, deserialize_with = "string_or_seq")]
    pub input_token: Vec<String>,
    /// Response field(s) holding the next cursor
    #[serde(default, deserialize_with = "string_or_seq")]
    pub output_token: Vec<String>,
    /// Response field(s) holding the list of interest
    #[serde(default, deserialize_with = "string_or_seq")]
    pub result_key: Vec<String>,
    /// Parameter limiting the page size, when the operation supports one
    #[serde(default)]
    pub limit_key: Option<String>,
    /// Boolean response field indicating truncation
    #[serde(default)]
    pub more_results: Option<String>,
}

/// Verdict an acceptor produces when its matcher holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptorState {
    Success,
    Failure,
    Retry,
}

/// How an acceptor inspects the attempt's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Matcher {
    Path,
    PathAny,
    PathAll,
    Status,
    Error,
}

/// One rule in a waiter's ordered condition list
#[derive(Debug, Clone, Deserialize)]
pub struct Acceptor {
    pub state: AcceptorState,
    pub matcher: Matcher,
    /// Path expression for the path matchers; unused for status/error
    #[serde(default)]
    pub argument: Option<String>,
    pub expected: Value,
}

/// Completion-wait descriptor
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterConfig {
    /// Operation to poll; defaults to the operation the waiter is declared on
    #[serde(default)]
    pub operation: Option<String>,
    /// Seconds to suspend between attempts
    #[serde(rename = "delay")]
    pub delay_seconds: u64,
    pub max_attempts: u32,
    /// Evaluated in declared order; first match wins per attempt
    pub acceptors: Vec<Acceptor>,
}

/// Immutable description of one callable operation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationModel {
    /// Filled from the registry key during load
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub http: HttpRoute,
    #[serde(default)]
    pub input: Option<ShapeRef>,
    #[serde(default)]
    pub output: Option<ShapeRef>,
    #[serde(default)]
    pub pagination: Option<PaginationConfig>,
    #[serde(default)]
    pub waiters: HashMap<String, WaiterConfig>,
}

impl OperationModel {
    /// Whether the operation can drive a paginator.
    pub fn is_paginable(&self) -> bool {
        self.pagination.is_some()
    }
}

/// Raw file layout; operations get their names and Arc wrapping in `load`.
#[derive(Debug, Deserialize)]
struct RawServiceModel {
    #[serde(default)]
    service: String,
    #[serde(default)]
    operations: HashMap<String, OperationModel>,
}

/// Registry of operation models for one service
#[derive(Debug, Clone)]
pub struct ServiceModel {
    service: String,
    operations: HashMap<String, Arc<OperationModel>>,
}

impl ServiceModel {
    /// Parse and validate model data from a JSON string.
    pub fn from_json(data: &str) -> Result<Self, ModelError> {
        let raw: RawServiceModel = serde_json::from_str(data)?;
        Self::load(raw)
    }

    /// Parse and validate model data from a file on disk.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn load(raw: RawServiceModel) -> Result<Self, ModelError> {
        let mut operations = HashMap::with_capacity(raw.operations.len());
        for (name, mut op) in raw.operations {
            if let Some(pagination) = &op.pagination {
                if pagination.output_token.is_empty() {
                    return Err(ModelError::MissingOutputToken(name));
                }
            }
            op.name = name.clone();
            operations.insert(name, Arc::new(op));
        }
        Ok(Self {
            service: raw.service,
            operations,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Look up an operation model by name.
    pub fn operation(&self, name: &str) -> Option<&Arc<OperationModel>> {
        self.operations.get(name)
    }

    /// All operation names, for diagnostics and autocomplete.
    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.keys().map(|s| s.as_str()).collect()
    }
}
