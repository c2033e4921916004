use std::collections::BTreeMap;
use std::time::Duration;

use cnda_engine::{
    submit_download, ApiClient, ClientSettings, DownloadRequest, FailureKind, ReqwestApiClient,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestApiClient {
    ReqwestApiClient::new(&ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn login_posts_form_and_returns_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login_status": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client_for(&server).login("alice", "s3cret").await.unwrap();
    assert_eq!(status, 0);
}

#[tokio::test]
async fn rejected_login_surfaces_nonzero_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login_status": 1 })))
        .mount(&server)
        .await;

    let status = client_for(&server).login("alice", "wrong").await.unwrap();
    assert_eq!(status, 1);
}

#[tokio::test]
async fn projects_and_subjects_are_listed_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["NP1173", "MSC"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/MSC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["MSC01", "MSC02"])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.projects().await.unwrap(), vec!["NP1173", "MSC"]);
    assert_eq!(client.subjects("MSC").await.unwrap(), vec!["MSC01", "MSC02"]);
}

#[tokio::test]
async fn submit_sends_job_body_and_tolerates_any_ack() {
    let server = MockServer::start().await;
    let job_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .and(body_json(json!({
            "download_job_id": job_id.to_string(),
            "subject_ids": ["A", "B"],
            "project_id": "P1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued, thanks"))
        .expect(1)
        .mount(&server)
        .await;

    let request = DownloadRequest {
        download_job_id: job_id,
        subject_ids: vec!["A".into(), "B".into()],
        project_id: "P1".into(),
    };
    submit_download(&client_for(&server), &request)
        .await
        .expect("submission settles ok");
}

#[tokio::test]
async fn submit_reports_transport_failure() {
    // Nothing listens on the reserved port 9 (discard) in test sandboxes.
    let client = ReqwestApiClient::new(&ClientSettings {
        base_url: "http://127.0.0.1:9/".into(),
        connect_timeout: Duration::from_millis(200),
        request_timeout: Duration::from_millis(500),
    })
    .unwrap();
    let request = DownloadRequest {
        download_job_id: Uuid::new_v4(),
        subject_ids: vec!["A".into()],
        project_id: "P1".into(),
    };

    let err = submit_download(&client, &request).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[tokio::test]
async fn status_is_fetched_by_job_id() {
    let server = MockServer::start().await;
    let job_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/api/download/status/{job_id}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "A": "in_progress", "B": "complete" })),
        )
        .mount(&server)
        .await;

    let statuses = client_for(&server).download_status(job_id).await.unwrap();
    let expected: BTreeMap<String, String> = [
        ("A".to_string(), "in_progress".to_string()),
        ("B".to_string(), "complete".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(statuses, expected);
}

#[tokio::test]
async fn unknown_job_answer_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/download/status/{}", Uuid::nil())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("Download job not found")))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .download_status(Uuid::nil())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedResponse);
}

#[tokio::test]
async fn http_errors_carry_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).projects().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn slow_status_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let client = ReqwestApiClient::new(&ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    })
    .unwrap();
    let err = client.projects().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}
