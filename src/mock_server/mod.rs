//! Mock CircleCI API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the
//! CircleCI v1.1 API and its artifact storage. Unlike wiremock which mocks
//! at the HTTP level per-test, this server maintains state across requests,
//! enabling realistic workflow testing.
//!
//! # Example
//!
//! ```ignore
//! use circleci_api::mock_server::MockServer;
//! use circleci_api::{list_recent_builds, CircleClient};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = CircleClient::new("test-token", &server.api_url()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let builds = list_recent_builds(&client).await.unwrap();
//!     assert_eq!(builds[0].build_num, 103);
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{Fixtures, DEFAULT_TOKEN};
pub use server::MockServer;
pub use state::{ArtifactFile, MockState};
