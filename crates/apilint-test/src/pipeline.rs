//! End-to-end pipeline tests against the mock management plane.
//!
//! Run with: `cargo test -p apilint-test`

use serde_json::{json, Value};

use apilint::{DocumentFormat, LintError, Pipeline, Severity, SpecKind};

use crate::fixtures::{definition_event, event_with_resources, packaged_ruleset, RESOURCE_ID};
use crate::{MockManagementPlane, StubEngine};

const PETSTORE_YAML: &str = "openapi: 3.0.0\ninfo:\n  title: Petstore\n  version: '1'\npaths:\n  /pets:\n    get:\n      responses:\n        '200':\n          $ref: '#/components/responses/Pets'\n          description: siblings\n";

const REF_SIBLINGS: &str = r##"[
  {
    "code": "no-$ref-siblings",
    "path": ["paths", "/pets", "get", "responses", "200", "description"],
    "message": "$ref must not be placed next to any other properties",
    "severity": 1,
    "range": { "start": { "line": 10, "character": 22 }, "end": { "line": 10, "character": 30 } },
    "source": "petstore.yaml"
  }
]"##;

fn pipeline(plane: &MockManagementPlane, engine: StubEngine) -> Pipeline<StubEngine> {
    Pipeline::new(&plane.config(packaged_ruleset()), engine).expect("pipeline builds")
}

// ---------------------------------------------------------------------------
// Trigger validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn zero_resources_rejected_before_io() {
    let plane = MockManagementPlane::start().await;
    let engine = StubEngine::default();
    let event = event_with_resources(0);

    let err = pipeline(&plane, engine.clone())
        .run("inv-0", Some(&event))
        .await
        .unwrap_err();

    assert!(matches!(err, LintError::TriggerShape(_)));
    assert_eq!(plane.request_count().await, 0);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn two_resources_rejected_before_io() {
    let plane = MockManagementPlane::start().await;
    let event = event_with_resources(2);

    let err = pipeline(&plane, StubEngine::default())
        .run("inv-2", Some(&event))
        .await
        .unwrap_err();

    assert!(matches!(err, LintError::TriggerShape(_)));
    assert_eq!(plane.request_count().await, 0);
}

#[tokio::test]
async fn missing_event_rejected() {
    let plane = MockManagementPlane::start().await;
    let err = pipeline(&plane, StubEngine::default())
        .run("inv-none", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LintError::TriggerShape(_)));
    assert_eq!(plane.request_count().await, 0);
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inline_yaml_is_linted_and_reported() {
    let plane = MockManagementPlane::start().await;
    plane.mount_export("inline", PETSTORE_YAML).await;
    plane.mount_upload(200).await;
    let engine = StubEngine::from_spectral_json(REF_SIBLINGS);

    let report = pipeline(&plane, engine.clone())
        .run("inv-1", Some(&definition_event(RESOURCE_ID)))
        .await
        .unwrap();

    assert_eq!(report.format, DocumentFormat::Yaml);
    assert_eq!(report.kind, SpecKind::OpenApi("3.0.0".into()));
    assert_eq!(report.contract.title, "Petstore");
    assert_eq!(report.resource.to_string(), RESOURCE_ID);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].severity, Severity::Warning);

    assert_eq!(engine.seen(), vec![(DocumentFormat::Yaml, PETSTORE_YAML.to_string())]);

    let uploads = plane.uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0]["format"], "inline");
    assert_eq!(
        plane.uploaded_results(0).await,
        json!([{
            "analyzer": "spectral",
            "description": "$ref must not be placed next to any other properties",
            "analyzerRuleName": "no-$ref-siblings",
            "severity": "warning",
            "docUrl": null,
            "details": { "range": { "start": "10:22", "end": "10:30" } }
        }])
    );
}

#[tokio::test]
async fn link_export_lints_linked_body() {
    let plane = MockManagementPlane::start().await;
    let body = r#"{"openapi":"3.1.0","info":{"title":"Petstore","version":"1"},"paths":{}}"#;
    let url = plane.mount_document("/blobs/petstore.json", body).await;
    plane.mount_export("json-link", &url).await;
    plane.mount_upload(200).await;
    let engine = StubEngine::default();

    let report = pipeline(&plane, engine.clone())
        .run("inv-link", Some(&definition_event(RESOURCE_ID)))
        .await
        .unwrap();

    assert_eq!(report.format, DocumentFormat::Json);
    assert_eq!(engine.seen(), vec![(DocumentFormat::Json, body.to_string())]);

    let paths = plane.request_paths().await;
    assert_eq!(paths.len(), 3);
    assert!(paths[0].ends_with("/exportSpecification"));
    assert_eq!(paths[1], "/blobs/petstore.json");
    assert!(paths[2].ends_with("/analysisReport"));
}

#[tokio::test]
async fn no_diagnostics_uploads_empty_report() {
    let plane = MockManagementPlane::start().await;
    plane.mount_export("inline", PETSTORE_YAML).await;
    plane.mount_upload(200).await;

    let report = pipeline(&plane, StubEngine::default())
        .run("inv-clean", Some(&definition_event(RESOURCE_ID)))
        .await
        .unwrap();

    assert!(report.results.is_empty());
    assert_eq!(plane.uploaded_results(0).await, Value::Array(Vec::new()));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_rejection_is_upload_error() {
    let plane = MockManagementPlane::start().await;
    plane.mount_export("inline", PETSTORE_YAML).await;
    plane.mount_upload(500).await;
    let engine = StubEngine::from_spectral_json(REF_SIBLINGS);

    let err = pipeline(&plane, engine.clone())
        .run("inv-upload", Some(&definition_event(RESOURCE_ID)))
        .await
        .unwrap_err();

    assert!(matches!(err, LintError::Upload(_)));
    assert_eq!(engine.calls(), 1);
    assert_eq!(plane.uploads().await.len(), 1);
}

#[tokio::test]
async fn export_failure_stops_before_lint() {
    let plane = MockManagementPlane::start().await;
    plane.mount_export_status(404).await;
    let engine = StubEngine::default();

    let err = pipeline(&plane, engine.clone())
        .run("inv-404", Some(&definition_event(RESOURCE_ID)))
        .await
        .unwrap_err();

    assert!(matches!(err, LintError::RemoteFetch(_)));
    assert_eq!(engine.calls(), 0);
    assert!(plane.uploads().await.is_empty());
}

#[tokio::test]
async fn unparseable_document_stops_before_lint() {
    let plane = MockManagementPlane::start().await;
    plane.mount_export("inline", "openapi: [3.0.0\n  info: {").await;
    plane.mount_upload(200).await;
    let engine = StubEngine::default();

    let err = pipeline(&plane, engine.clone())
        .run("inv-parse", Some(&definition_event(RESOURCE_ID)))
        .await
        .unwrap_err();

    assert!(matches!(err, LintError::Parse(_)));
    assert_eq!(engine.calls(), 0);
    assert!(plane.uploads().await.is_empty());
}

#[tokio::test]
async fn missing_ruleset_stops_before_lint() {
    let plane = MockManagementPlane::start().await;
    plane.mount_export("inline", PETSTORE_YAML).await;
    let engine = StubEngine::default();
    let config = plane.config("/nonexistent/spectral.yaml".into());

    let err = Pipeline::new(&config, engine.clone())
        .unwrap()
        .run("inv-ruleset", Some(&definition_event(RESOURCE_ID)))
        .await
        .unwrap_err();

    assert!(matches!(err, LintError::Ruleset(_)));
    assert_eq!(engine.calls(), 0);
}
