//! Client surface
//!
//! The [`Client`] binds a service model to its collaborators and exposes
//! the access patterns built on single-call execution.
//!
//! # Module Structure
//!
//! - [`command`] - Bound invocations and call options
//! - [`pipeline`] - serialize → sign → send → interpret, plus the default
//!   serializer and error parser
//! - [`future`] - Execution results and the deferred-result handle
//! - [`paginate`] - Token-chained page and element sequences
//! - [`waiter`] - Acceptor-driven condition polling
//!
//! # Example
//!
//! ```ignore
//! use awscall::{Client, ServiceModel};
//!
//! async fn example() -> awscall::AwsResult<()> {
//!     let model = ServiceModel::from_json(include_str!("model.json")).unwrap();
//!     let client = Client::builder(model)
//!         .endpoint("https://widgets.example.com")
//!         .static_token("token")
//!         .build()?;
//!     let output = client.call("GetWidget", serde_json::json!({"Id": "w-1"})).await?;
//!     println!("{}", output.output);
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod future;
pub mod paginate;
pub mod pipeline;
pub mod waiter;

pub use command::{CallOptions, Command};
pub use future::{CallOutput, DeferredOutput, ExecutionResult};
pub use paginate::{ItemPaginator, Paginator};
pub use pipeline::{JsonErrorParser, RestJsonSerializer};
pub use waiter::WaitOutcome;

use crate::config::ClientConfig;
use crate::error::{AwsError, AwsResult};
use crate::model::ServiceModel;
use crate::transport::{
    ErrorParser, HttpTransport, ProvideCredentials, Serializer, Signer, StaticCredentials,
    TokenSigner, Transport,
};
use pipeline::Handlers;
use serde_json::Value;
use std::sync::Arc;

/// Client for one modeled service.
///
/// Cheap to clone; the model and collaborators are shared. Holds no
/// per-call mutable state, so concurrent executions never contend.
#[derive(Clone)]
pub struct Client {
    model: Arc<ServiceModel>,
    handlers: Arc<Handlers>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    pub fn builder(model: ServiceModel) -> ClientBuilder {
        ClientBuilder::new(model)
    }

    pub fn model(&self) -> &ServiceModel {
        &self.model
    }

    /// Bind an operation to concrete parameters.
    pub fn build_command(
        &self,
        operation: &str,
        parameters: Value,
        options: CallOptions,
    ) -> AwsResult<Command> {
        let Some(model) = self.model.operation(operation) else {
            return Err(AwsError::validation(operation, "unknown operation"));
        };
        Command::new(Arc::clone(model), parameters, options)
    }

    /// Drive one command through the execution pipeline.
    pub async fn execute(&self, command: &Command) -> AwsResult<ExecutionResult> {
        pipeline::execute(&self.handlers, command).await
    }

    /// Build and execute a blocking command, resolving to its output.
    pub async fn call(&self, operation: &str, parameters: Value) -> AwsResult<CallOutput> {
        let command = self.build_command(operation, parameters, CallOptions::default())?;
        self.execute(&command).await?.resolve().await
    }

    /// Lazy sequence of result pages for a list-type operation.
    pub fn paginate(&self, operation: &str, parameters: Value) -> AwsResult<Paginator> {
        let model = self.resolved_operation(operation)?;
        Paginator::new(self.clone(), model, parameters)
    }

    /// Lazy sequence of result-set elements, flattened across pages.
    pub fn iterate(&self, operation: &str, parameters: Value) -> AwsResult<ItemPaginator> {
        let model = self.resolved_operation(operation)?;
        ItemPaginator::new(self.clone(), model, parameters)
    }

    fn resolved_operation(&self, operation: &str) -> AwsResult<Arc<crate::model::OperationModel>> {
        let Some(model) = self.model.operation(operation) else {
            return Err(AwsError::validation(operation, "unknown operation"));
        };
        Ok(Arc::clone(model))
    }

    /// Poll `operation` until the named waiter settles.
    pub async fn wait(
        &self,
        waiter: &str,
        operation: &str,
        parameters: Value,
    ) -> AwsResult<WaitOutcome> {
        let Some(model) = self.model.operation(operation) else {
            return Err(AwsError::validation(operation, "unknown operation"));
        };
        let Some(config) = model.waiters.get(waiter) else {
            return Err(AwsError::validation(
                operation,
                format!("unknown waiter: {waiter}"),
            ));
        };
        waiter::run(self, waiter, operation, config, parameters).await
    }
}

/// Builds a [`Client`], filling in default collaborators where none are
/// supplied.
pub struct ClientBuilder {
    model: ServiceModel,
    config: ClientConfig,
    serializer: Option<Arc<dyn Serializer>>,
    signer: Option<Arc<dyn Signer>>,
    credentials: Option<Arc<dyn ProvideCredentials>>,
    transport: Option<Arc<dyn Transport>>,
    error_parser: Option<Arc<dyn ErrorParser>>,
}

impl ClientBuilder {
    fn new(model: ServiceModel) -> Self {
        Self {
            model,
            config: ClientConfig::default(),
            serializer: None,
            signer: None,
            credentials: None,
            transport: None,
            error_parser: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Base endpoint for the default HTTP transport.
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.config.endpoint = Some(endpoint.to_string());
        self
    }

    /// Use fixed token credentials.
    pub fn static_token(mut self, token: &str) -> Self {
        self.credentials = Some(Arc::new(StaticCredentials::new(token)));
        self
    }

    pub fn serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    pub fn credentials(mut self, provider: impl ProvideCredentials + 'static) -> Self {
        self.credentials = Some(Arc::new(provider));
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn error_parser(mut self, parser: impl ErrorParser + 'static) -> Self {
        self.error_parser = Some(Arc::new(parser));
        self
    }

    pub fn build(self) -> AwsResult<Client> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let Some(endpoint) = self.config.effective_endpoint() else {
                    return Err(AwsError::validation(
                        "client",
                        "no endpoint configured and no transport supplied",
                    ));
                };
                let transport = HttpTransport::with_config(&endpoint, &self.config)
                    .map_err(|e| AwsError::validation("client", e.to_string()).with_cause(e))?;
                Arc::new(transport)
            }
        };

        let handlers = Handlers {
            serializer: self
                .serializer
                .unwrap_or_else(|| Arc::new(RestJsonSerializer)),
            signer: self.signer.unwrap_or_else(|| Arc::new(TokenSigner)),
            credentials: self
                .credentials
                .unwrap_or_else(|| Arc::new(StaticCredentials::new(""))),
            transport,
            error_parser: self
                .error_parser
                .unwrap_or_else(|| Arc::new(JsonErrorParser)),
        };

        Ok(Client {
            model: Arc::new(self.model),
            handlers: Arc::new(handlers),
        })
    }
}
