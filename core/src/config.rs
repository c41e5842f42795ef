#![deny(missing_docs)]

//! # Generator Configuration
//!
//! Settings that shape generated names. Loaded from YAML or JSON, every key
//! optional; the CLI layers its flags over whatever the file provides.

use crate::error::{AppError, AppResult};
use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Namespace used when neither the config nor the API title supplies one.
pub const DEFAULT_ROOT_NAMESPACE: &str = "crate::api";

/// What to do when two operations derive the same handler name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Report a diagnostic and keep going. A name-keyed consumer keeps the
    /// last binding.
    #[default]
    Warn,
    /// Report the diagnostic, then fail the run.
    Deny,
}

/// Naming and rendering settings for a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Root module the entities live under, e.g. `crate::harbor`.
    pub root_namespace: Option<String>,
    /// Sub-module holding the schema types.
    pub entities_namespace: String,
    /// Literal used when an operation has no body (or it cannot be resolved).
    pub empty_type: String,
    /// Handler-name collision handling.
    pub collision_policy: CollisionPolicy,
    /// Fixed resource name for fallback handler naming.
    pub resource: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root_namespace: None,
            entities_namespace: "entities".to_string(),
            empty_type: "()".to_string(),
            collision_policy: CollisionPolicy::Warn,
            resource: None,
        }
    }
}

impl GeneratorConfig {
    /// Parses a config document (YAML or JSON).
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse generator config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Rejects settings that would render unusable type paths.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(root) = &self.root_namespace {
            if root.trim().is_empty() || root.ends_with("::") {
                return Err(AppError::Config(format!(
                    "root-namespace '{}' is not a module path",
                    root
                )));
            }
        }
        if self.entities_namespace.trim().is_empty() {
            return Err(AppError::Config("entities-namespace must not be empty".into()));
        }
        if self.empty_type.trim().is_empty() {
            return Err(AppError::Config("empty-type must not be empty".into()));
        }
        Ok(())
    }

    /// Root namespace for a bundle: the configured one, else
    /// `crate::<snake title>`, else [`DEFAULT_ROOT_NAMESPACE`].
    pub fn root_namespace_for(&self, api_title: Option<&str>) -> String {
        if let Some(root) = &self.root_namespace {
            return root.clone();
        }
        api_title
            .map(|t| t.to_snake_case())
            .filter(|t| !t.is_empty())
            .map(|t| format!("crate::{}", t))
            .unwrap_or_else(|| DEFAULT_ROOT_NAMESPACE.to_string())
    }
}
