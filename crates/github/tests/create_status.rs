use github::GithubClient;
use mockito::Matcher;
use reporting::{
    CommitSha, CommitState, CommitStatusPublisher, CommitTarget, ContextLabel, Organization,
    PublishError, Repository, StatusReport,
};

fn target() -> CommitTarget {
    CommitTarget {
        org: Organization::new("acme").unwrap(),
        repo: Repository::new("widgets").unwrap(),
        sha: CommitSha::new("deadbeef").unwrap(),
    }
}

fn report(state: CommitState, description: &str) -> StatusReport {
    StatusReport {
        context: ContextLabel::new(ContextLabel::DEFAULT_BASE, Some("lint")),
        state,
        description: description.to_string(),
        target_url: "https://console.example/builds/b1".to_string(),
    }
}

fn client(url: String) -> GithubClient {
    GithubClient::new(reqwest::Client::builder().user_agent("test").build().unwrap(), url, "ghp_x")
}

#[tokio::test]
async fn posts_status_payload_and_reads_back_state() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/repos/acme/widgets/statuses/deadbeef")
        .match_header("authorization", "Bearer ghp_x")
        .match_header("accept", "application/vnd.github+json")
        .match_header("x-github-api-version", "2022-11-28")
        .match_body(Matcher::Json(serde_json::json!({
            "state": "success",
            "target_url": "https://console.example/builds/b1",
            "description": "SUCCESS (5s)",
            "context": "ci/cloudbuild/lint",
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "state": "success", "context": "ci/cloudbuild/lint"}"#)
        .create_async()
        .await;

    let receipt = client(server.url())
        .create_status(&target(), &report(CommitState::Success, "SUCCESS (5s)"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(receipt.state, CommitState::Success);
    assert_eq!(receipt.http_status, 201);
}

#[tokio::test]
async fn http_error_is_rejected_with_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/repos/acme/widgets/statuses/deadbeef")
        .with_status(422)
        .with_body(r#"{"message":"Validation Failed"}"#)
        .create_async()
        .await;

    let err = client(server.url())
        .create_status(&target(), &report(CommitState::Pending, "WORKING"))
        .await
        .unwrap_err();

    match err {
        PublishError::Rejected { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("Validation Failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let err = client("http://127.0.0.1:9".to_string())
        .create_status(&target(), &report(CommitState::Error, "TIMEOUT"))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Transport { .. }));
}
