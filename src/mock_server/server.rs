//! Mock CircleCI API server.
//!
//! Provides an axum-based HTTP server that simulates the v1.1 API and the
//! artifact storage it links to.

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;

/// Path prefix of the API routes.
const API_PREFIX: &str = "/api/v1.1";

/// A mock CircleCI API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with the default scenario.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `api_url()` as the client's base URL.
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_scenario()).await
    }

    /// Start a mock server with empty state and no token requirement.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(mut state: MockState) -> Self {
        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");
        let url = format!("http://{}", addr);

        state.base_url = url.clone();
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url,
            handle,
            state: shared_state,
        }
    }

    /// Get the root URL of the mock server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the API base URL to pass to `CircleClient::new`.
    pub fn api_url(&self) -> String {
        format!("{}{}/", self.url, API_PREFIX)
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the axum router with all routes.
    pub(crate) fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        let api = Router::new()
            .route("/recent-builds", get(handlers::recent_builds))
            .route(
                "/project/github/:username/:project",
                get(handlers::project_builds),
            )
            .route(
                "/project/github/:username/:project/:build/artifacts",
                get(handlers::list_artifacts),
            );

        Router::new()
            .nest(API_PREFIX, api)
            // Artifact storage
            .route(
                "/files/:username/:project/:build_num/*path",
                get(handlers::download_artifact),
            )
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
