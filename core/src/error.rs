//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Only fatal conditions live here. Per-operation problems that generation
//! recovers from are reported as [`crate::diagnostics::Diagnostic`] values.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A source document is unreachable or structurally invalid.
    #[from(ignore)]
    #[display("Failed to load '{uri}': {reason}")]
    Load {
        /// URI of the offending document.
        uri: String,
        /// What went wrong.
        reason: String,
    },

    /// Two schema definitions share a name across the merged documents.
    #[from(ignore)]
    #[display("Duplicate schema definition '{name}' in '{second}' (already defined in '{first}')")]
    DuplicateDefinition {
        /// The clashing definition name.
        name: String,
        /// Document that declared the name first.
        first: String,
        /// Document that declared it again.
        second: String,
    },

    /// Two operations derived the same handler name under the `deny` policy.
    #[from(ignore)]
    #[display("Handler name '{handler_name}' is produced by both {first} and {second}")]
    NamingCollision {
        /// The colliding handler name.
        handler_name: String,
        /// First operation, as `METHOD path`.
        first: String,
        /// Second operation, as `METHOD path`.
        second: String,
    },

    /// Invalid generator configuration.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl AppError {
    /// Shorthand for a [`AppError::Load`] on `uri`.
    pub fn load(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
