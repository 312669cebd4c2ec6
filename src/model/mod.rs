//! Service model layer
//!
//! This module provides the data-driven description of a remote service.
//! Operation definitions are loaded from JSON model data once per service
//! and shared read-only across all commands, so new operations, paginators,
//! and waiters can be added without code changes.
//!
//! # Architecture
//!
//! - [`registry`] - Parses and validates service model JSON, keyed lookup by
//!   operation name
//! - [`paths`] - Dot-notation path resolution used by paginators and waiter
//!   acceptors

pub mod paths;
mod registry;

pub use registry::{
    Acceptor, AcceptorState, HttpRoute, Matcher, ModelError, OperationModel, PaginationConfig,
    ServiceModel, ShapeRef, WaiterConfig,
};
