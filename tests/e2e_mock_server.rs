//! E2E tests using the mock CircleCI server.
//!
//! These tests exercise full workflows against the mock server,
//! testing realistic scenarios rather than individual endpoints.

#![cfg(feature = "test-server")]

use circleci_api::mock_server::{Fixtures, MockServer, MockState, DEFAULT_TOKEN};
use circleci_api::{
    download_artifact, find_build_with_artifacts, list_artifacts, list_recent_builds,
    search_builds, ArtifactQuery, BuildQuery, BuildRef, CircleClient, CircleError,
};

async fn start() -> (MockServer, CircleClient) {
    let server = MockServer::start().await;
    let client = CircleClient::new(DEFAULT_TOKEN, &server.api_url()).unwrap();
    (server, client)
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = MockServer::start().await;
    let url = server.url().to_string();

    server.shutdown().await;

    let result = reqwest::Client::new()
        .get(format!("{}/health", url))
        .send()
        .await;

    assert!(result.is_err());
}

// =============================================================================
// Build Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_recent_builds_newest_first() {
    let (server, client) = start().await;

    let builds = list_recent_builds(&client).await.expect("Failed to list builds");

    let nums: Vec<u64> = builds.iter().map(|b| b.build_num).collect();
    assert_eq!(nums, vec![103, 102, 101, 100, 7]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_search_by_branch_and_status() {
    let (server, client) = start().await;

    let query = BuildQuery::new("acme", "widgets").branch("main").status("failed");
    let builds = search_builds(&client, &query).await.expect("Failed to search");

    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].build_num, 102);
    assert_eq!(builds[0].outcome.as_deref(), Some("failed"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_search_pagination_passes_through() {
    let (server, client) = start().await;

    let query = BuildQuery::new("acme", "widgets").limit(2).offset(1);
    let builds = search_builds(&client, &query).await.expect("Failed to search");

    let nums: Vec<u64> = builds.iter().map(|b| b.build_num).collect();
    assert_eq!(nums, vec![102, 101]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_project_is_not_found() {
    let (server, client) = start().await;

    let err = search_builds(&client, &BuildQuery::new("acme", "nope"))
        .await
        .unwrap_err();

    let api = err.as_api_error().expect("Expected API error");
    assert_eq!(api.status_code, 404);
    assert_eq!(api.message, "Project not found");

    server.shutdown().await;
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = MockServer::start().await;
    let client = CircleClient::new("", &server.api_url()).unwrap();

    let err = list_recent_builds(&client).await.unwrap_err();

    assert!(matches!(err, CircleError::Api(ref api) if api.status_code == 401));

    server.shutdown().await;
}

// =============================================================================
// Artifact Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_find_then_download_artifacts() {
    let (server, client) = start().await;

    // Step 1: newest "test" build with artifacts on main
    let search = BuildQuery::new("acme", "widgets").branch("main").job("test").limit(100);
    let build_num = find_build_with_artifacts(&client, &search)
        .await
        .expect("Failed to search")
        .expect("Expected a build with artifacts");
    assert_eq!(build_num, 102);

    // Step 2: list its artifacts
    let query = ArtifactQuery::new("acme", "widgets", build_num);
    let artifacts = list_artifacts(&client, &query).await.expect("Failed to list");
    assert_eq!(artifacts.len(), 2);

    // Step 3: download them one by one
    let root = tempfile::tempdir().unwrap();
    for artifact in &artifacts {
        download_artifact(&client, artifact, root.path())
            .await
            .expect("Failed to download");
    }

    let junit = std::fs::read_to_string(root.path().join("reports/junit.xml")).unwrap();
    assert!(junit.contains("failures=\"1\""));
    assert!(root.path().join("coverage/html/index.html").is_file());

    server.shutdown().await;
}

#[tokio::test]
async fn test_latest_build_artifacts() {
    let (server, client) = start().await;

    // Build 103 is the latest and is still running, so it has none
    let query = ArtifactQuery::new("acme", "widgets", BuildRef::Latest);
    let artifacts = list_artifacts(&client, &query).await.expect("Failed to list");

    assert!(artifacts.is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_download_stops_at_first_failure() {
    let state = MockState::new()
        .with_required_token(DEFAULT_TOKEN)
        .with_build(
            "acme",
            "widgets",
            Fixtures::with_artifacts(Fixtures::finished_build(
                "acme", "widgets", 5, "main", "success", "test",
            )),
        )
        .with_artifact("acme", "widgets", 5, "one.txt", "1")
        .with_artifact("acme", "widgets", 5, "two.txt", "2")
        .with_artifact("acme", "widgets", 5, "three.txt", "3");

    let server = MockServer::with_state(state).await;
    let client = CircleClient::new(DEFAULT_TOKEN, &server.api_url()).unwrap();

    let artifacts = list_artifacts(&client, &ArtifactQuery::new("acme", "widgets", 5u64))
        .await
        .expect("Failed to list");
    assert_eq!(artifacts.len(), 3);

    // Remove the second file from storage after listing
    server
        .state()
        .write()
        .await
        .artifacts
        .get_mut(&("acme/widgets".to_string(), 5))
        .unwrap()
        .retain(|f| f.path != "two.txt");

    let root = tempfile::tempdir().unwrap();
    let mut result = Ok(());
    for artifact in &artifacts {
        if let Err(err) = download_artifact(&client, artifact, root.path()).await {
            result = Err(err);
            break;
        }
    }

    let err = result.unwrap_err();
    assert_eq!(err.as_api_error().map(|e| e.status_code), Some(404));
    assert!(root.path().join("one.txt").is_file());
    assert!(!root.path().join("two.txt").exists());
    assert!(!root.path().join("three.txt").exists());

    server.shutdown().await;
}
