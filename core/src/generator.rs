#![deny(missing_docs)]

//! # Generation Run
//!
//! Adapts every operation of a bundle and collects the results into a
//! [`GenerationReport`]. A failing operation degrades to fallback types; only
//! the `deny` collision policy can fail a run once the bundle is loaded.

use crate::adapter::naming::to_snake_case;
use crate::adapter::{BindingDescriptor, GeneratorContext, OperationAdapter};
use crate::config::CollisionPolicy;
use crate::contract::{client_path, client_url};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{AppError, AppResult};
use crate::oas::paths::{is_placeholder, strip_prefix};
use crate::oas::{HttpMethod, Operation};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

/// Resource name used when nothing better is available.
pub const FALLBACK_RESOURCE: &str = "root";

/// One generated binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Path as declared in the bundle.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Resource the handler was named after.
    pub resource: String,
    /// Path as the client addresses it.
    pub client_path: String,
    /// Full client URL, when a base URL was attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_url: Option<String>,
    /// Request type, response type and handler name.
    #[serde(flatten)]
    pub descriptor: BindingDescriptor,
}

impl Binding {
    fn label(&self) -> String {
        format!("{} {}", self.method.as_str().to_uppercase(), self.path)
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Module path the schema types are qualified under.
    pub namespace: String,
    /// Bindings in bundle declaration order.
    pub bindings: Vec<Binding>,
    /// Every diagnostic of the run.
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    /// Bindings keyed by handler name.
    ///
    /// When two bindings share a name, the later one wins. Each such case was
    /// reported as a [`Diagnostic::NamingCollision`].
    pub fn by_handler(&self) -> IndexMap<&str, &Binding> {
        self.bindings
            .iter()
            .map(|b| (b.descriptor.handler_name.as_str(), b))
            .collect()
    }

    /// Looks up the binding for one operation.
    pub fn binding(&self, method: HttpMethod, path: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| b.method == method && b.path == path)
    }

    /// Fills `client_url` on every binding.
    pub fn attach_client_urls(&mut self, base: &str) -> AppResult<()> {
        for binding in &mut self.bindings {
            binding.client_url = Some(client_url(base, &binding.client_path, true)?.to_string());
        }
        Ok(())
    }
}

/// Picks the resource name an operation's handler is derived from: the
/// configured resource, else the first tag, else the first literal path
/// segment after the common prefix, else [`FALLBACK_RESOURCE`].
pub fn resource_for(
    configured: Option<&str>,
    operation: &Operation,
    path: &str,
    common_prefix: &[String],
) -> String {
    let from_config = configured.map(to_snake_case).filter(|r| !r.is_empty());
    let from_tag = || {
        operation
            .tags
            .first()
            .map(|t| to_snake_case(t))
            .filter(|r| !r.is_empty())
    };
    let from_path = || {
        strip_prefix(path, common_prefix)
            .into_iter()
            .find(|seg| !is_placeholder(seg))
            .map(to_snake_case)
            .filter(|r| !r.is_empty())
    };
    from_config
        .or_else(from_tag)
        .or_else(from_path)
        .unwrap_or_else(|| FALLBACK_RESOURCE.to_string())
}

/// Adapts every operation of the context's bundle.
///
/// Diagnostics go to `sink` as they are found and are also returned in the
/// report. Under [`CollisionPolicy::Deny`] the first handler-name collision
/// fails the run after all operations have been adapted.
pub fn generate(
    context: &GeneratorContext,
    sink: &dyn DiagnosticSink,
) -> AppResult<GenerationReport> {
    let bundle = context.bundle();
    let config = context.config();
    let prefix = bundle.common_prefix();

    let mut bindings = Vec::with_capacity(bundle.operation_count());
    let mut diagnostics = Vec::new();

    for (path, method, operation) in bundle.operations() {
        let resource = resource_for(config.resource.as_deref(), operation, path, prefix);
        let adaptation =
            OperationAdapter::new(sink, &resource, method, path, operation, context).adapt();
        debug!(
            %method,
            path,
            handler = %adaptation.descriptor.handler_name,
            "Adapted operation"
        );
        diagnostics.extend(adaptation.diagnostics);
        bindings.push(Binding {
            path: path.to_string(),
            method,
            client_path: client_path(path, prefix),
            client_url: None,
            resource,
            descriptor: adaptation.descriptor,
        });
    }

    let mut first_collision = None;
    let mut seen: IndexMap<&str, String> = IndexMap::new();
    for binding in &bindings {
        let label = binding.label();
        if let Some(previous) = seen.insert(&binding.descriptor.handler_name, label.clone()) {
            let diagnostic = Diagnostic::NamingCollision {
                handler_name: binding.descriptor.handler_name.clone(),
                first: previous.clone(),
                second: label.clone(),
            };
            sink.report(&diagnostic);
            diagnostics.push(diagnostic);
            first_collision.get_or_insert(AppError::NamingCollision {
                handler_name: binding.descriptor.handler_name.clone(),
                first: previous,
                second: label,
            });
        }
    }

    if config.collision_policy == CollisionPolicy::Deny {
        if let Some(err) = first_collision {
            return Err(err);
        }
    }

    info!(
        bindings = bindings.len(),
        diagnostics = diagnostics.len(),
        namespace = context.namespace().root(),
        "Generation finished"
    );

    Ok(GenerationReport {
        namespace: context.namespace().entities_path(),
        bindings,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::diagnostics::CollectingSink;
    use crate::oas::schema::Definition;
    use crate::oas::{Bundle, PathOperations, SchemaRef, SchemaRegistry};
    use pretty_assertions::assert_eq;

    fn op(operation_id: Option<&str>, response: Option<&str>) -> Operation {
        let mut responses = IndexMap::new();
        responses.insert("200".to_string(), response.map(SchemaRef::named));
        Operation {
            operation_id: operation_id.map(str::to_string),
            responses,
            ..Operation::default()
        }
    }

    fn context(ops: Vec<(&str, HttpMethod, Operation)>, config: GeneratorConfig) -> GeneratorContext {
        let mut registry = SchemaRegistry::new();
        registry
            .insert("Team", Definition::Enum { values: vec![] }, "root")
            .unwrap();
        let mut paths: IndexMap<String, PathOperations> = IndexMap::new();
        for (path, method, op) in ops {
            paths.entry(path.to_string()).or_default().insert(method, op);
        }
        let bundle = Bundle::new(Some("Harbor".into()), paths, registry, Vec::new());
        GeneratorContext::new(bundle, config).unwrap()
    }

    #[test]
    fn test_resource_for() {
        let prefix = vec!["api".to_string(), "v1".to_string()];
        let tagged = Operation {
            tags: vec!["Team Members".to_string()],
            ..Operation::default()
        };
        let untagged = Operation::default();

        assert_eq!(resource_for(Some("Team"), &tagged, "/api/v1/x", &prefix), "team");
        assert_eq!(resource_for(None, &tagged, "/api/v1/x", &prefix), "team_members");
        assert_eq!(
            resource_for(None, &untagged, "/api/v1/{id}/sbom", &prefix),
            "sbom"
        );
        assert_eq!(resource_for(None, &untagged, "/api/v1/{id}", &prefix), "root");
    }

    #[test]
    fn test_generate_in_declaration_order() {
        let ctx = context(
            vec![
                ("/api/v1/team/{teamId}", HttpMethod::Get, op(None, Some("Team"))),
                ("/api/v1/team/{teamId}/summary", HttpMethod::Get, op(None, Some("Team"))),
                ("/api/v1/team/{teamId}", HttpMethod::Delete, op(None, None)),
            ],
            GeneratorConfig::default(),
        );
        let sink = CollectingSink::new();
        let report = generate(&ctx, &sink).unwrap();

        let names: Vec<&str> = report
            .bindings
            .iter()
            .map(|b| b.descriptor.handler_name.as_str())
            .collect();
        // Methods of a path follow the canonical verb order.
        assert_eq!(names, vec!["get_team", "delete_team", "get_team_summary"]);
        assert_eq!(report.namespace, "crate::harbor::entities");
        assert_eq!(report.bindings[0].client_path, "/team/{teamId}");
        assert!(report.diagnostics.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_dangling_reference_is_isolated() {
        let ctx = context(
            vec![
                ("/api/v1/team/{teamId}/summary", HttpMethod::Get, op(None, Some("Ghost"))),
                ("/api/v1/team/{teamId}", HttpMethod::Get, op(None, Some("Team"))),
            ],
            GeneratorConfig::default(),
        );
        let sink = CollectingSink::new();
        let report = generate(&ctx, &sink).unwrap();

        assert_eq!(report.bindings.len(), 2);
        let summary = report
            .binding(HttpMethod::Get, "/api/v1/team/{teamId}/summary")
            .unwrap();
        assert_eq!(summary.descriptor.handler_name, "get_team_summary");
        assert!(report
            .binding(HttpMethod::Delete, "/api/v1/team/{teamId}")
            .is_none());
        assert_eq!(report.bindings[0].descriptor.response_type, "()");
        assert_eq!(
            report.bindings[1].descriptor.response_type,
            "crate::harbor::entities::Team"
        );
        assert_eq!(report.diagnostics.len(), 1);
        assert!(matches!(
            &report.diagnostics[0],
            Diagnostic::UnresolvedReference { reference, .. } if reference == "Ghost"
        ));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_collision_warns_and_last_wins() {
        let ctx = context(
            vec![
                ("/api/v1/team", HttpMethod::Get, op(Some("getTeam"), Some("Team"))),
                ("/api/v1/teams", HttpMethod::Get, op(Some("get_team"), None)),
            ],
            GeneratorConfig::default(),
        );
        let sink = CollectingSink::new();
        let report = generate(&ctx, &sink).unwrap();

        assert_eq!(report.bindings.len(), 2);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::NamingCollision {
                handler_name: "get_team".into(),
                first: "GET /api/v1/team".into(),
                second: "GET /api/v1/teams".into(),
            }]
        );
        let by_handler = report.by_handler();
        assert_eq!(by_handler.len(), 1);
        assert_eq!(by_handler["get_team"].path, "/api/v1/teams");
    }

    #[test]
    fn test_collision_denied() {
        let config = GeneratorConfig {
            collision_policy: CollisionPolicy::Deny,
            ..GeneratorConfig::default()
        };
        let ctx = context(
            vec![
                ("/api/v1/team", HttpMethod::Get, op(Some("getTeam"), None)),
                ("/api/v1/teams", HttpMethod::Get, op(Some("get_team"), None)),
            ],
            config,
        );
        let sink = CollectingSink::new();
        let err = generate(&ctx, &sink).unwrap_err();
        assert!(matches!(err, AppError::NamingCollision { ref handler_name, .. } if handler_name == "get_team"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_report_serialization_and_client_urls() {
        let ctx = context(
            vec![("/api/v1/team/{teamId}", HttpMethod::Get, op(None, Some("Team")))],
            GeneratorConfig::default(),
        );
        let mut report = generate(&ctx, &CollectingSink::new()).unwrap();
        report
            .attach_client_urls("https://harbor.example.com/api")
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        let binding = &json["bindings"][0];
        assert_eq!(binding["method"], "get");
        assert_eq!(binding["handlerName"], "get_team");
        assert_eq!(binding["requestType"], "()");
        assert_eq!(binding["responseType"], "crate::harbor::entities::Team");
        assert_eq!(binding["clientPath"], "/team/{teamId}");
        assert_eq!(
            binding["clientUrl"],
            "https://harbor.example.com/api/v1/team/%7BteamId%7D?children=true"
        );
    }
}
