//! Artifact endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{error_response, unauthorized};
use crate::mock_server::state::{project_key, MockState};

/// Query parameters carrying only the token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    #[serde(rename = "circle-token")]
    pub circle_token: Option<String>,
}

/// GET /project/github/{username}/{project}/{build}/artifacts
pub async fn list_artifacts(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((username, project, build)): Path<(String, String, String)>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let state = state.read().await;

    if !state.authorized(query.circle_token.as_deref()) {
        return unauthorized();
    }

    let key = project_key(&username, &project);
    match state.resolve_build(&key, &build) {
        Some(build_num) => (StatusCode::OK, Json(state.list_artifacts(&key, build_num))).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Build not found"),
    }
}

/// GET /files/{username}/{project}/{build_num}/{path}
pub async fn download_artifact(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((username, project, build_num, path)): Path<(String, String, u64, String)>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let state = state.read().await;

    if !state.authorized(query.circle_token.as_deref()) {
        return unauthorized();
    }

    let key = project_key(&username, &project);
    match state.artifact_contents(&key, build_num, &path) {
        Some(contents) => (StatusCode::OK, contents.to_vec()).into_response(),
        // Artifact storage answers with a bare status, no JSON body
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
