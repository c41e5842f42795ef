#![deny(missing_docs)]

//! # Harbor Gen Core
//!
//! Schema-driven API binding generator. Loads an OpenAPI/Swagger bundle and
//! derives, per operation, a request type, a response type and a handler name.

/// Shared error types.
pub mod error;

/// Generator settings.
pub mod config;

/// Non-fatal findings and their sinks.
pub mod diagnostics;

/// OpenAPI (OAS) loading and schema model.
pub mod oas;

/// Per-operation adaptation and naming.
pub mod adapter;

/// Whole-bundle generation run.
pub mod generator;

/// Client request contract.
pub mod contract;

pub use adapter::{Adaptation, BindingDescriptor, GeneratorContext, OperationAdapter};
pub use config::{CollisionPolicy, GeneratorConfig};
pub use contract::{client_request, ClientRequest};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink, TypeRole};
pub use error::{AppError, AppResult};
pub use generator::{generate, Binding, GenerationReport};
pub use oas::{Bundle, BundleLoader, FsFetcher, HttpMethod, MemoryFetcher, SchemaRef};
