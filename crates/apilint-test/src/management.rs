//! MockManagementPlane: wiremock stand-in for the definition endpoints.

use std::path::PathBuf;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use apilint::{Credential, LinterConfig};

/// `api-version` the harness expects on every management call.
pub const TEST_API_VERSION: &str = "2024-03-01";

/// Bearer token the harness hands out and checks for.
pub const TEST_TOKEN: &str = "test-token";

/// A fake management plane plus link host, on one local port.
pub struct MockManagementPlane {
    server: MockServer,
}

impl MockManagementPlane {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Pipeline config pointed at this server, with a static token.
    pub fn config(&self, ruleset: PathBuf) -> LinterConfig {
        LinterConfig::new()
            .with_management_endpoint(self.uri())
            .with_api_version(TEST_API_VERSION)
            .with_ruleset_path(ruleset)
            .with_credential(Credential::Static(TEST_TOKEN.into()))
    }

    /// Answer `exportSpecification` with `{format, value}`.
    pub async fn mount_export(&self, format: &str, value: &str) {
        Mock::given(method("POST"))
            .and(path_regex("/definitions/[^/]+/exportSpecification$"))
            .and(query_param("api-version", TEST_API_VERSION))
            .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "format": format, "value": value })),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer `exportSpecification` with a bare status.
    pub async fn mount_export_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path_regex("/exportSpecification$"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Serve `body` at `doc_path` and return its absolute URL.
    pub async fn mount_document(&self, doc_path: &str, body: &str) -> String {
        Mock::given(method("GET"))
            .and(path(doc_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
        format!("{}{}", self.uri(), doc_path)
    }

    /// Answer `analysisReport` with `status`.
    pub async fn mount_upload(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path_regex("/definitions/[^/]+/analysisReport$"))
            .and(query_param("api-version", TEST_API_VERSION))
            .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    async fn requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
    }

    /// Total requests received, of any kind.
    pub async fn request_count(&self) -> usize {
        self.requests().await.len()
    }

    /// Paths of received requests, in arrival order.
    pub async fn request_paths(&self) -> Vec<String> {
        self.requests()
            .await
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }

    /// Decoded bodies of every `analysisReport` call.
    pub async fn uploads(&self) -> Vec<Value> {
        self.requests()
            .await
            .iter()
            .filter(|r| r.url.path().ends_with("/analysisReport"))
            .map(|r| serde_json::from_slice(&r.body).expect("report body is JSON"))
            .collect()
    }

    /// Results array embedded in the `n`th report.
    pub async fn uploaded_results(&self, n: usize) -> Value {
        let uploads = self.uploads().await;
        let value = uploads[n]["value"]
            .as_str()
            .expect("report value is a string");
        serde_json::from_str(value).expect("report value is JSON")
    }
}
