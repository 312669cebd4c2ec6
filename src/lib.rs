//! awscall - model-driven execution core for AWS-style service APIs
//!
//! A declarative service model (operation names, HTTP routes, pagination
//! hints, waiter conditions) drives every call: commands are bound against
//! the model, pushed through a serialize → sign → send → interpret
//! pipeline, and the model's metadata powers the two derived engines -
//! token-chained pagination and acceptor-driven waiters.
//!
//! The wire dialect, signing algorithm, transport, and credential source
//! are collaborators behind traits in [`transport`]; defaults for all of
//! them ship with the crate, so a working client needs only a model, an
//! endpoint, and a token.
//!
//! ```ignore
//! use awscall::{Client, ServiceModel};
//! use serde_json::json;
//!
//! # async fn example() -> awscall::AwsResult<()> {
//! let model = ServiceModel::from_file("widgets.json".as_ref()).expect("valid model data");
//! let client = Client::builder(model)
//!     .endpoint("https://widgets.example.com")
//!     .static_token(&std::env::var("WIDGETS_TOKEN").unwrap_or_default())
//!     .build()?;
//!
//! // Single call
//! let widget = client.call("GetWidget", json!({"Id": "w-1"})).await?;
//!
//! // Paged iteration
//! let mut pages = client.paginate("ListWidgets", json!({}))?;
//! while let Some(page) = pages.next_page().await {
//!     println!("{}", page?);
//! }
//!
//! // Condition polling
//! client.wait("WidgetReady", "GetWidget", json!({"Id": "w-1"})).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod transport;

pub use client::{
    CallOptions, CallOutput, Client, ClientBuilder, Command, DeferredOutput, ExecutionResult,
    ItemPaginator, Paginator, WaitOutcome,
};
pub use config::ClientConfig;
pub use error::{AwsError, AwsResult, ErrorKind};
pub use model::{OperationModel, ServiceModel};
