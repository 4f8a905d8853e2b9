use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde_json::json;
use stagehand_core::config::AuthScheme;
use stagehand_core::credentials::Credentials;
use stagehand_maven::portal::{DeploymentState, PortalClient, PublishingType};
use stagehand_util::errors::StagehandError;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers status polls with `states` in order, repeating the last one.
struct StateSequence {
    states: Vec<&'static str>,
    calls: AtomicUsize,
}

impl StateSequence {
    fn new(states: &[&'static str]) -> Self {
        Self {
            states: states.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for StateSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.states[call.min(self.states.len() - 1)];
        ResponseTemplate::new(200).set_body_json(json!({
            "deploymentId": "dep-1",
            "deploymentName": "com.example-lib-1.0.0",
            "deploymentState": state,
            "purls": ["pkg:maven/com.example/lib@1.0.0"]
        }))
    }
}

fn client(server: &MockServer) -> PortalClient {
    PortalClient::new(&server.uri(), Credentials::new("user", "pass"))
        .unwrap()
        .with_polling(Duration::ZERO, Duration::from_secs(5))
}

async fn mount_states(server: &MockServer, states: &[&'static str]) {
    Mock::given(method("POST"))
        .and(path("/publisher/status"))
        .and(query_param("id", "dep-1"))
        .respond_with(StateSequence::new(states))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_validation_sequences_end_in_success() {
    let sequences: [&[&'static str]; 4] = [
        &["PENDING", "VALIDATING", "VALIDATED", "PUBLISHED"],
        &["VALIDATED", "PUBLISHED"],
        &["PUBLISHING", "PUBLISHED"],
        &["PUBLISHED"],
    ];
    for states in sequences {
        let server = MockServer::start().await;
        mount_states(&server, states).await;
        let deployment = client(&server).validate_deployment("dep-1").await.unwrap();
        assert!(deployment.state.passed_validation(), "sequence {states:?}");
    }
}

#[tokio::test]
async fn test_validation_stops_at_first_passing_state() {
    let server = MockServer::start().await;
    mount_states(&server, &["PENDING", "VALIDATING", "VALIDATED", "PUBLISHED"]).await;
    let deployment = client(&server).validate_deployment("dep-1").await.unwrap();
    assert_eq!(deployment.state, DeploymentState::Validated);
}

#[tokio::test]
async fn test_failed_deployment_reports_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publisher/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deploymentId": "dep-1",
            "deploymentState": "FAILED",
            "errors": { "pom.xml": ["Invalid POM file"] }
        })))
        .mount(&server)
        .await;

    let err = client(&server).validate_deployment("dep-1").await.unwrap_err();
    assert!(matches!(err, StagehandError::ValidationFailed { .. }));
    let msg = err.to_string();
    assert!(msg.contains("pom.xml"), "got: {msg}");
    assert!(msg.contains("Invalid POM file"), "got: {msg}");
}

#[tokio::test]
async fn test_failed_deployment_without_errors() {
    let server = MockServer::start().await;
    mount_states(&server, &["FAILED"]).await;
    let err = client(&server).validate_deployment("dep-1").await.unwrap_err();
    assert!(
        err.to_string().contains("No error details available"),
        "got: {err}"
    );
}

#[tokio::test]
async fn test_validation_timeout_names_last_state() {
    let server = MockServer::start().await;
    mount_states(&server, &["PENDING"]).await;
    let client = PortalClient::new(&server.uri(), Credentials::new("user", "pass"))
        .unwrap()
        .with_polling(Duration::from_millis(100), Duration::from_secs(1));

    let started = Instant::now();
    let err = client.validate_deployment("dep-1").await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, StagehandError::ValidationTimeout { .. }));
    assert!(err.to_string().contains("PENDING"), "got: {err}");
    assert!(elapsed >= Duration::from_secs(1), "took {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
}

#[tokio::test]
async fn test_status_errors_are_retried_while_polling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publisher/status"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_states(&server, &["VALIDATED"]).await;

    let deployment = client(&server).validate_deployment("dep-1").await.unwrap();
    assert_eq!(deployment.state, DeploymentState::Validated);
}

#[tokio::test]
async fn test_upload_returns_deployment_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publisher/upload"))
        .and(query_param("name", "com.example-lib-1.0.0"))
        .and(query_param("publishingType", "USER_MANAGED"))
        .and(header("authorization", "Bearer dXNlcjpwYXNz"))
        .and(body_string_contains("name=\"bundle\""))
        .respond_with(ResponseTemplate::new(201).set_body_string("dep-42\n"))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let bundle = tmp.path().join("bundle.zip");
    std::fs::write(&bundle, b"PK").unwrap();

    let id = client(&server)
        .upload("com.example-lib-1.0.0", PublishingType::UserManaged, &bundle)
        .await
        .unwrap();
    assert_eq!(id, "dep-42");
}

#[tokio::test]
async fn test_upload_failure_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publisher/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bundle has no POM files"))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let bundle = tmp.path().join("bundle.zip");
    std::fs::write(&bundle, b"PK").unwrap();

    let err = client(&server)
        .upload("x", PublishingType::Automatic, &bundle)
        .await
        .unwrap_err();
    assert!(matches!(err, StagehandError::UploadFailed { status: 400, .. }));
    assert!(err.to_string().contains("Bundle has no POM files"));
}

#[tokio::test]
async fn test_user_token_scheme_header() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/publisher/deployment/dep-1"))
        .and(header("authorization", "UserToken dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .with_auth_scheme(AuthScheme::UserToken)
        .delete_deployment("dep-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_publish_deployment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publisher/deployment/dep-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).publish_deployment("dep-1").await.unwrap();
}

#[tokio::test]
async fn test_delete_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/publisher/deployment/dep-1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown deployment"))
        .mount(&server)
        .await;

    let err = client(&server).delete_deployment("dep-1").await.unwrap_err();
    assert!(matches!(
        err,
        StagehandError::RemoteRejected { status: 404, .. }
    ));
    assert!(err.to_string().contains("unknown deployment"));
}
