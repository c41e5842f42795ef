use harbor_gen_core::{
    generate, BundleLoader, CollectingSink, Diagnostic, GenerationReport, GeneratorConfig,
    GeneratorContext, HttpMethod, MemoryFetcher, OperationAdapter,
};
use pretty_assertions::assert_eq;

const ROOT: &str = "file:///harbor/openapi.yaml";

const ROOT_DOC: &str = r#"
openapi: 3.0.3
info:
  title: Harbor
  version: 1.0.0
paths:
  /api/v1/team/{teamId}:
    parameters:
      - name: teamId
        in: path
        required: true
        schema: {type: string}
    get:
      tags: [team]
      responses:
        '200':
          description: The team
          content:
            application/json:
              schema: {$ref: 'components.yaml#/components/schemas/TeamAlias'}
        '404':
          description: Not found
    put:
      tags: [team]
      operationId: updateTeam
      requestBody:
        content:
          application/json:
            schema: {$ref: 'components.yaml#/components/schemas/Team'}
      responses:
        '200':
          description: Updated
          content:
            application/json:
              schema: {$ref: 'components.yaml#/components/schemas/Team'}
  /api/v1/team/{teamId}/summary:
    get:
      tags: [team]
      responses:
        '200':
          description: Summary
          content:
            application/json:
              schema: {$ref: 'components.yaml#/components/schemas/Missing'}
  /api/v1/team/{teamId}/members:
    get:
      tags: [team]
      responses:
        '200':
          description: Members
          content:
            application/json:
              schema:
                type: array
                items: {$ref: './member.yaml'}
"#;

const COMPONENTS_DOC: &str = r#"
components:
  schemas:
    TeamAlias:
      $ref: '#/components/schemas/TeamRef'
    TeamRef:
      $ref: '#/components/schemas/Team'
    Team:
      type: object
      properties:
        id: {type: string, format: uuid}
        name: {type: string}
"#;

const MEMBER_DOC: &str = r#"
type: object
properties:
  email: {type: string}
"#;

fn fetcher() -> MemoryFetcher {
    MemoryFetcher::new()
        .with_document(ROOT, ROOT_DOC)
        .with_document("file:///harbor/components.yaml", COMPONENTS_DOC)
        .with_document("file:///harbor/member.yaml", MEMBER_DOC)
}

async fn context() -> GeneratorContext {
    let bundle = BundleLoader::new(fetcher(), ROOT)
        .unwrap()
        .load()
        .await
        .unwrap();
    GeneratorContext::new(bundle, GeneratorConfig::default()).unwrap()
}

#[tokio::test]
async fn test_team_bindings() {
    let context = context().await;
    let sink = CollectingSink::new();
    let report = generate(&context, &sink).unwrap();

    let rows: Vec<(&str, &str, &str)> = report
        .bindings
        .iter()
        .map(|b| {
            (
                b.descriptor.handler_name.as_str(),
                b.descriptor.request_type.as_str(),
                b.descriptor.response_type.as_str(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("get_team", "()", "crate::harbor::entities::Team"),
            (
                "update_team",
                "crate::harbor::entities::Team",
                "crate::harbor::entities::Team"
            ),
            ("get_team_summary", "()", "()"),
            (
                "get_team_members",
                "()",
                "Vec<crate::harbor::entities::Member>"
            ),
        ]
    );

    let members = report
        .binding(HttpMethod::Get, "/api/v1/team/{teamId}/members")
        .unwrap();
    assert_eq!(members.resource, "team");
    assert_eq!(members.client_path, "/team/{teamId}/members");

    // Only the dangling summary response is reported.
    assert_eq!(report.diagnostics.len(), 1);
    assert!(matches!(
        &report.diagnostics[0],
        Diagnostic::UnresolvedReference { path, .. } if path == "/api/v1/team/{teamId}/summary"
    ));
    assert_eq!(sink.diagnostics(), report.diagnostics);
}

#[tokio::test]
async fn test_single_operation_adaptation() {
    let context = context().await;
    let sink = CollectingSink::new();
    let path = "/api/v1/team/{teamId}";
    let operation = context.bundle().operation(path, HttpMethod::Get).unwrap();

    let first = OperationAdapter::new(&sink, "team", HttpMethod::Get, path, operation, &context)
        .adapt();
    let second = OperationAdapter::new(&sink, "team", HttpMethod::Get, path, operation, &context)
        .adapt();

    assert_eq!(first, second);
    assert_eq!(first.descriptor.handler_name, "get_team");
    assert_eq!(
        first.descriptor.response_type,
        "crate::harbor::entities::Team"
    );
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_parallel_adaptation_matches_sequential() {
    let context = context().await;
    let sequential = generate(&context, &CollectingSink::new()).unwrap();

    let sink = CollectingSink::new();
    let operations: Vec<_> = context.bundle().operations().collect();
    let parallel: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = operations
            .iter()
            .map(|(path, method, operation)| {
                let (context, sink) = (&context, &sink);
                scope.spawn(move || {
                    OperationAdapter::new(sink, "team", *method, path, operation, context)
                        .adapt()
                        .descriptor
                        .handler_name
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect()
    });

    let expected: Vec<String> = sequential
        .bindings
        .iter()
        .map(|b| b.descriptor.handler_name.clone())
        .collect();
    assert_eq!(parallel, expected);
    assert_eq!(sink.len(), 1);
}

async fn generate_split(root: &str, fetcher: MemoryFetcher) -> GenerationReport {
    let bundle = BundleLoader::new(fetcher, root)
        .unwrap()
        .load()
        .await
        .unwrap();
    let context = GeneratorContext::new(bundle, GeneratorConfig::default()).unwrap();
    generate(&context, &CollectingSink::new()).unwrap()
}

const SPLIT_ROOT: &str = r#"
openapi: 3.0.3
info: {title: Harbor, version: 1.0.0}
paths:
  /api/v1/team/{teamId}:
    get:
      responses:
        '200':
          description: The team
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Team'}
components:
  schemas:
    Team: {$ref: '__TARGET__'}
"#;

#[tokio::test]
async fn test_root_reexports_whole_schema_document() {
    let fetcher = MemoryFetcher::new()
        .with_document(ROOT, SPLIT_ROOT.replace("__TARGET__", "./schemas/Team.yaml"))
        .with_document(
            "file:///harbor/schemas/Team.yaml",
            "type: object\nproperties:\n  name: {type: string}\n",
        );

    let report = generate_split(ROOT, fetcher).await;
    assert_eq!(
        report.bindings[0].descriptor.response_type,
        "crate::harbor::entities::Team"
    );
    assert!(report.diagnostics.is_empty());
}

#[tokio::test]
async fn test_root_reexports_component_of_common_document() {
    let fetcher = MemoryFetcher::new()
        .with_document(
            ROOT,
            SPLIT_ROOT.replace("__TARGET__", "common.yaml#/components/schemas/Team"),
        )
        .with_document(
            "file:///harbor/common.yaml",
            "components:\n  schemas:\n    Team: {type: object}\n",
        );

    let report = generate_split(ROOT, fetcher).await;
    assert_eq!(
        report.bindings[0].descriptor.response_type,
        "crate::harbor::entities::Team"
    );
    assert!(report.diagnostics.is_empty());
}
