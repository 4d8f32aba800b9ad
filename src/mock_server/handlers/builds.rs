//! Build endpoint handlers.

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
use crate::Build;

/// Query parameters accepted by build list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListBuildsQuery {
    #[serde(rename = "circle-token")]
    pub circle_token: Option<String>,
    pub branch: Option<String>,
    pub filter: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListBuildsQuery {
    fn page(&self, builds: Vec<&Build>) -> Vec<Build> {
        builds
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(30))
            .cloned()
            .collect()
    }
}

/// GET /recent-builds
pub async fn recent_builds(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(query): Query<ListBuildsQuery>,
) -> Response {
    let state = state.read().await;

    if !state.authorized(query.circle_token.as_deref()) {
        return unauthorized();
    }

    let builds = query.page(state.recent_builds());
    (StatusCode::OK, Json(builds)).into_response()
}

/// GET /project/github/{username}/{project}
pub async fn project_builds(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((username, project)): Path<(String, String)>,
    Query(query): Query<ListBuildsQuery>,
) -> Response {
    let state = state.read().await;

    if !state.authorized(query.circle_token.as_deref()) {
        return unauthorized();
    }

    let key = project_key(&username, &project);
    if !state.has_project(&key) {
        return error_response(StatusCode::NOT_FOUND, "Project not found");
    }

    let builds = state.list_builds(&key, query.branch.as_deref(), query.filter.as_deref());
    (StatusCode::OK, Json(query.page(builds))).into_response()
}
