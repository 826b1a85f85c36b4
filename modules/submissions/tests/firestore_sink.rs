use httpmock::prelude::*;
use serde_json::json;

use submissions::config::FirestoreConfig;
use submissions::contract::{SinkError, SubmissionRecord};
use submissions::domain::ports::RecordSink;
use submissions::infra::firestore::{credentials::ServiceAccount, FirestoreSink};

const TEST_KEY: &str = include_str!("fixtures/test_service_account_key.pem");
const DOCS_PATH: &str = "/v1/projects/demo-project/databases/(default)/documents/users";

fn account(token_uri: &str) -> ServiceAccount {
    let json = json!({
        "type": "service_account",
        "project_id": "demo-project",
        "client_email": "writer@demo-project.iam.gserviceaccount.com",
        "private_key": TEST_KEY,
        "token_uri": token_uri,
    });
    ServiceAccount::from_json(&json.to_string(), "test").unwrap()
}

fn production_sink(server: &MockServer) -> FirestoreSink {
    let cfg = FirestoreConfig {
        base_url: server.base_url(),
        ..Default::default()
    };
    FirestoreSink::with_service_account(&cfg, account(&server.url("/token"))).unwrap()
}

fn record() -> SubmissionRecord {
    SubmissionRecord::new(vec![("email".into(), "ada@example.com".into())])
}

#[tokio::test]
async fn appends_with_bearer_token_and_caches_it() {
    let server = MockServer::start_async().await;
    let token = server.mock_async(|when, then| {
        when.method(POST)
            .path("/token")
            .header("content-type", "application/x-www-form-urlencoded");
        then.status(200)
            .json_body(json!({"access_token": "tok-1", "expires_in": 3600, "token_type": "Bearer"}));
    })
    .await;
    let create = server.mock_async(|when, then| {
        when.method(POST)
            .path(DOCS_PATH)
            .header("authorization", "Bearer tok-1");
        then.status(200).json_body(json!({
            "name": "projects/demo-project/databases/(default)/documents/users/abc",
            "fields": {}
        }));
    })
    .await;

    let sink = production_sink(&server);
    sink.append_record("users", &record()).await.unwrap();
    sink.append_record("users", &record()).await.unwrap();

    token.assert_hits_async(1).await;
    create.assert_hits_async(2).await;
}

#[tokio::test]
async fn non_success_status_is_rejected_with_message() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path("/token");
        then.status(200)
            .json_body(json!({"access_token": "tok", "expires_in": 3600}));
    })
    .await;
    let create = server.mock_async(|when, then| {
        when.method(POST).path(DOCS_PATH);
        then.status(403).json_body(json!({
            "error": {
                "code": 403,
                "message": "Missing or insufficient permissions.",
                "status": "PERMISSION_DENIED"
            }
        }));
    })
    .await;

    let err = production_sink(&server)
        .append_record("users", &record())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SinkError::rejected(403, "Missing or insufficient permissions.")
    );
    create.assert_hits_async(1).await;
}

#[tokio::test]
async fn token_endpoint_failure_is_auth_error_and_skips_write() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path("/token");
        then.status(400)
            .json_body(json!({"error": "invalid_grant"}));
    })
    .await;
    let create = server.mock_async(|when, then| {
        when.method(POST).path(DOCS_PATH);
        then.status(200).json_body(json!({}));
    })
    .await;

    let err = production_sink(&server)
        .append_record("users", &record())
        .await
        .unwrap_err();

    assert!(matches!(err, SinkError::Auth(_)));
    assert!(err.to_string().contains("invalid_grant"));
    create.assert_hits_async(0).await;
}

#[tokio::test]
async fn emulator_mode_posts_without_token() {
    let server = MockServer::start_async().await;
    let create = server.mock_async(|when, then| {
        when.method(POST).path(DOCS_PATH);
        then.status(200).json_body(json!({}));
    })
    .await;

    let address = server.address().to_string();
    let cfg = FirestoreConfig {
        project_id: Some("demo-project".into()),
        ..Default::default()
    };
    let sink = FirestoreSink::from_config_with_env(&cfg, |name| {
        (name == "FIRESTORE_EMULATOR_HOST").then(|| address.clone())
    })
    .unwrap();

    assert!(sink.uses_emulator());
    sink.append_record("users", &record()).await.unwrap();
    create.assert_hits_async(1).await;
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let sink = FirestoreSink::emulator("127.0.0.1:1", "demo-project", "(default)").unwrap();
    let err = sink.append_record("users", &record()).await.unwrap_err();
    assert!(matches!(err, SinkError::Transport(_)));
}
