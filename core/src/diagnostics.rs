#![deny(missing_docs)]

//! # Diagnostics
//!
//! Non-fatal findings of a generation run and the sinks that receive them.
//! Generation never stops for these; it records them and carries on with a
//! fallback.

use crate::oas::HttpMethod;
use derive_more::Display;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Which side of an operation a type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRole {
    /// The request body.
    #[display("request")]
    Request,
    /// The success response body.
    #[display("response")]
    Response,
}

/// A recoverable problem found while generating bindings.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Diagnostic {
    /// A request/response schema reference could not be resolved; the empty
    /// type was substituted.
    #[display("{method} {path}: unresolved {role} schema '{reference}': {reason}")]
    UnresolvedReference {
        /// Operation method.
        method: HttpMethod,
        /// Operation path.
        path: String,
        /// Request or response.
        role: TypeRole,
        /// The failing reference.
        reference: String,
        /// Why resolution failed.
        reason: String,
    },
    /// Two operations derived the same handler name.
    #[display("handler name '{handler_name}' produced by both {first} and {second}")]
    NamingCollision {
        /// The shared name.
        handler_name: String,
        /// Earlier operation (`method path`).
        first: String,
        /// Later operation (`method path`).
        second: String,
    },
}

/// Receives diagnostics as they are produced.
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic.
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        warn!(%diagnostic, "generation diagnostic");
    }
}

/// Accumulates diagnostics in memory. Safe to share across threads.
#[derive(Debug, Default)]
pub struct CollectingSink {
    items: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of diagnostics reported so far.
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}
