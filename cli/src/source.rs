#![deny(missing_docs)]

//! # Source Arguments
//!
//! Options shared by every command: where the API description lives and how
//! the generator config is layered (file first, then flags).

use std::path::PathBuf;

use harbor_gen_core::{BundleLoader, GeneratorConfig, GeneratorContext};

use crate::error::CliResult;
use crate::fetch::CliFetcher;

/// Location of the API description and generator settings.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Root API description: a file path or an http(s)/file URL.
    #[clap(long, env = "HARBOR_GEN_SPEC", default_value = "docs/openapi.yaml")]
    pub spec: String,

    /// Generator config file (YAML or JSON).
    #[clap(long, env = "HARBOR_GEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root module path, e.g. `crate::harbor`. Overrides the config file.
    #[clap(long)]
    pub root_namespace: Option<String>,

    /// Resource name used for derived handler names. Overrides the config file.
    #[clap(long)]
    pub resource: Option<String>,
}

impl SourceArgs {
    /// Reads the config file, if any, and applies flag overrides.
    pub fn generator_config(&self) -> CliResult<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(root) = &self.root_namespace {
            config.root_namespace = Some(root.clone());
        }
        if let Some(resource) = &self.resource {
            config.resource = Some(resource.clone());
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads the bundle and builds the generation context.
    pub async fn context(&self, config: GeneratorConfig) -> CliResult<GeneratorContext> {
        let bundle = BundleLoader::new(CliFetcher, &self.spec)?.load().await?;
        Ok(GeneratorContext::new(bundle, config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_gen_core::CollisionPolicy;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("harbor-gen.yaml");
        fs::write(
            &config_path,
            "root-namespace: crate::from_file\ncollision-policy: deny\n",
        )
        .unwrap();

        let args = SourceArgs {
            spec: "openapi.yaml".into(),
            config: Some(config_path),
            root_namespace: Some("crate::from_flag".into()),
            resource: Some("team".into()),
        };
        let config = args.generator_config().unwrap();

        assert_eq!(config.root_namespace.as_deref(), Some("crate::from_flag"));
        assert_eq!(config.resource.as_deref(), Some("team"));
        assert_eq!(config.collision_policy, CollisionPolicy::Deny);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = SourceArgs {
            spec: "openapi.yaml".into(),
            config: None,
            root_namespace: Some("crate::".into()),
            resource: None,
        };
        assert!(args.generator_config().is_err());
    }
}
