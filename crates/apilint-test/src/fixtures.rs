//! Trigger payloads and paths shared by the integration tests.

use std::path::PathBuf;

use serde_json::{json, Value};

/// Definition every fixture event points at.
pub const RESOURCE_ID: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg-apis/providers/Microsoft.ApiCenter/services/contoso/workspaces/default/apis/petstore/versions/v1/definitions/openapi";

/// One `data.resources` entry for `id`.
pub fn resource_entry(id: &str) -> Value {
    json!({
        "armResource": {
            "id": id,
            "properties": {
                "title": "Petstore",
                "description": "Sample pet store definition",
                "specification": { "name": "openapi", "version": "3.0.0" }
            }
        }
    })
}

/// A definition-updated event carrying exactly one resource.
pub fn definition_event(id: &str) -> Value {
    json!({
        "id": "4f1c2d7e-0000-4000-8000-000000000001",
        "topic": "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg-apis/providers/Microsoft.ApiCenter/services/contoso",
        "subject": id,
        "eventType": "Microsoft.ApiCenter.ApiDefinitionUpdated",
        "eventTime": "2026-10-01T12:00:00Z",
        "dataVersion": "1",
        "data": { "resources": [resource_entry(id)] }
    })
}

/// An event whose `data.resources` holds `count` copies of the fixture resource.
pub fn event_with_resources(count: usize) -> Value {
    let resources: Vec<Value> = (0..count).map(|_| resource_entry(RESOURCE_ID)).collect();
    json!({
        "id": "4f1c2d7e-0000-4000-8000-000000000002",
        "eventType": "Microsoft.ApiCenter.ApiDefinitionUpdated",
        "data": { "resources": resources }
    })
}

/// The ruleset shipped under `resources/rulesets/`.
pub fn packaged_ruleset() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/apilint-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/")
        .parent()
        .expect("workspace root")
        .join("resources/rulesets/spectral.yaml")
}
