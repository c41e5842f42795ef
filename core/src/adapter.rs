#![deny(missing_docs)]

//! # Operation Adapter
//!
//! Turns one operation of a loaded bundle into a [`BindingDescriptor`]:
//! request type, response type and handler name.
//!
//! Adaptation is best-effort. A reference that cannot be resolved is replaced
//! by the configured empty type and reported as a [`Diagnostic`]; it never
//! fails the operation, let alone the run.

pub mod naming;

use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TypeRole};
use crate::error::AppResult;
use crate::oas::{Bundle, HttpMethod, Operation, Resolved, SchemaRef};
use naming::{derive_handler_name, to_handler_ident, TypeNamespace};
use serde::Serialize;
use tracing::debug;

/// Immutable state shared by every adapter of a run.
///
/// Built once after loading and passed by reference; it is `Send + Sync`, so
/// operations may be adapted on any number of threads.
#[derive(Debug, Clone)]
pub struct GeneratorContext {
    bundle: Bundle,
    config: GeneratorConfig,
    namespace: TypeNamespace,
}

impl GeneratorContext {
    /// Validates the config and fixes the type namespace for the bundle.
    pub fn new(bundle: Bundle, config: GeneratorConfig) -> AppResult<Self> {
        config.validate()?;
        let root = config.root_namespace_for(bundle.title());
        let namespace = TypeNamespace::new(root, config.entities_namespace.clone());
        Ok(Self {
            bundle,
            config,
            namespace,
        })
    }

    /// The loaded bundle.
    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// The generator settings.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Where schema types are qualified.
    pub fn namespace(&self) -> &TypeNamespace {
        &self.namespace
    }
}

/// What the generator emits per operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingDescriptor {
    /// Request body type, or the empty type.
    pub request_type: String,
    /// Success response type, or the empty type.
    pub response_type: String,
    /// Handler function identifier.
    pub handler_name: String,
}

/// A descriptor plus the diagnostics produced while deriving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adaptation {
    /// The produced binding.
    pub descriptor: BindingDescriptor,
    /// Recoverable problems, in the order found.
    pub diagnostics: Vec<Diagnostic>,
}

/// Adapts a single (path, method) operation.
pub struct OperationAdapter<'a> {
    sink: &'a dyn DiagnosticSink,
    resource: &'a str,
    method: HttpMethod,
    path: &'a str,
    operation: &'a Operation,
    context: &'a GeneratorContext,
}

impl<'a> OperationAdapter<'a> {
    /// Creates an adapter.
    ///
    /// * `sink` - Receives diagnostics as they are found.
    /// * `resource` - Resource name used when the handler name must be derived.
    /// * `method` / `path` / `operation` - The operation being adapted.
    /// * `context` - Bundle and settings for reference resolution.
    pub fn new(
        sink: &'a dyn DiagnosticSink,
        resource: &'a str,
        method: HttpMethod,
        path: &'a str,
        operation: &'a Operation,
        context: &'a GeneratorContext,
    ) -> Self {
        Self {
            sink,
            resource,
            method,
            path,
            operation,
            context,
        }
    }

    /// Derives the binding descriptor.
    pub fn adapt(&self) -> Adaptation {
        let mut diagnostics = Vec::new();

        let request_type = match &self.operation.request_body {
            Some(schema) => self.render(schema, TypeRole::Request, &mut diagnostics),
            None => self.empty_type(),
        };

        let response_type = match self.operation.success_response() {
            Some((_, Some(schema))) => self.render(schema, TypeRole::Response, &mut diagnostics),
            Some((status, None)) => {
                debug!(method = %self.method, path = self.path, status, "Success response has no body");
                self.empty_type()
            }
            None => {
                debug!(method = %self.method, path = self.path, "No success response declared");
                self.empty_type()
            }
        };

        let descriptor = BindingDescriptor {
            request_type,
            response_type,
            handler_name: self.handler_name(),
        };
        Adaptation {
            descriptor,
            diagnostics,
        }
    }

    /// The handler name: the normalized `operationId` when declared,
    /// otherwise derived from method, resource and path.
    pub fn handler_name(&self) -> String {
        match self.operation.operation_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => to_handler_ident(id),
            _ => derive_handler_name(
                self.method,
                self.resource,
                self.path,
                self.context.bundle().common_prefix(),
            ),
        }
    }

    fn render(
        &self,
        schema: &SchemaRef,
        role: TypeRole,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        match self.context.bundle().registry().resolve(schema) {
            Ok(resolved) => self.render_resolved(&resolved),
            Err(err) => {
                let diagnostic = Diagnostic::UnresolvedReference {
                    method: self.method,
                    path: self.path.to_string(),
                    role,
                    reference: err.reference().to_string(),
                    reason: err.to_string(),
                };
                self.sink.report(&diagnostic);
                diagnostics.push(diagnostic);
                self.empty_type()
            }
        }
    }

    fn render_resolved(&self, resolved: &Resolved) -> String {
        match resolved {
            Resolved::Named(name) => self.context.namespace().qualify(name),
            Resolved::Primitive(kind) => kind.rust_type().to_string(),
            Resolved::ArrayOf(inner) => format!("Vec<{}>", self.render_resolved(inner)),
        }
    }

    fn empty_type(&self) -> String {
        self.context.config().empty_type.clone()
    }
}
