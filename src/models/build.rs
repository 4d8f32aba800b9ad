//! Build model and list operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::client::{CircleClient, NO_QUERY};
use crate::error::Result;
use crate::models::project_path;
use crate::pagination::Pagination;
use crate::traits::List;

/// A CircleCI build (a single job run).
///
/// Builds are identified by their `build_num` within a project. Fields the
/// API omits or sends as `null` decode to their defaults.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Build {
    /// Build number, unique within the project.
    pub build_num: u64,

    /// Repository name.
    #[serde_as(as = "DefaultOnNull")]
    pub reponame: String,

    /// Owner of the repository.
    #[serde_as(as = "DefaultOnNull")]
    pub username: String,

    /// Branch the build ran on.
    #[serde_as(as = "DefaultOnNull")]
    pub branch: String,

    /// Overall status (e.g. "success", "failed", "running").
    #[serde_as(as = "DefaultOnNull")]
    pub status: String,

    /// Outcome once finished (e.g. "success", "failed", "canceled").
    pub outcome: Option<String>,

    /// Lifecycle stage (e.g. "queued", "running", "finished").
    #[serde_as(as = "DefaultOnNull")]
    pub lifecycle: String,

    /// Commit SHA that was built.
    #[serde_as(as = "DefaultOnNull")]
    pub vcs_revision: String,

    /// Repository URL.
    #[serde_as(as = "DefaultOnNull")]
    pub vcs_url: String,

    /// Tag that triggered the build, if any.
    pub vcs_tag: Option<String>,

    /// Commit subject line.
    pub subject: Option<String>,

    /// Commit message body.
    pub body: Option<String>,

    /// Why the build was triggered (e.g. "github", "retry").
    pub why: Option<String>,

    /// Link to the build in the web UI.
    #[serde_as(as = "DefaultOnNull")]
    pub build_url: String,

    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_date: Option<DateTime<Utc>>,

    pub committer_name: Option<String>,
    pub committer_email: Option<String>,
    pub committer_date: Option<DateTime<Utc>>,

    pub queued_at: Option<DateTime<Utc>>,
    pub usage_queued_at: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub stop_time: Option<DateTime<Utc>>,

    /// Wall-clock duration in milliseconds.
    pub build_time_millis: Option<u64>,

    /// Number of parallel containers.
    #[serde_as(as = "DefaultOnNull")]
    pub parallel: u32,

    /// Execution platform (e.g. "2.0").
    pub platform: Option<String>,

    /// Fleet that ran the build.
    pub fleet: Option<String>,

    /// Whether the build uploaded any artifacts.
    #[serde_as(as = "DefaultOnNull")]
    pub has_artifacts: bool,

    /// Pull requests associated with the build.
    #[serde_as(as = "DefaultOnNull")]
    pub pull_requests: Vec<serde_json::Value>,

    /// The user that caused the build.
    #[serde_as(as = "DefaultOnNull")]
    pub user: User,

    /// Workflow information for the job.
    #[serde_as(as = "DefaultOnNull")]
    pub workflows: Workflow,
}

/// The user that caused a build.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: Option<u64>,
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub login: String,
    pub vcs_type: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub is_user: bool,
    pub avatar_url: Option<String>,
}

/// Workflow information embedded in a build.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    #[serde_as(as = "DefaultOnNull")]
    pub job_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub job_name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub workflow_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub workflow_name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub workspace_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub upstream_job_ids: Vec<String>,
}

impl Build {
    /// Name of the workflow job this build ran.
    pub fn job_name(&self) -> &str {
        &self.workflows.job_name
    }

    /// Check whether this build ran the named workflow job.
    pub fn matches_job(&self, job: &str) -> bool {
        self.workflows.job_name == job
    }
}

/// Query parameters for searching a project's builds.
///
/// `username` and `project` become path segments; `branch`, `status`
/// (sent as `filter`), `limit` and `offset` become query keys. `job` is
/// never sent: the API cannot filter by job, so callers filter the results
/// with [`BuildQuery::accepts`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildQuery {
    #[serde(skip)]
    pub username: String,

    #[serde(skip)]
    pub project: String,

    /// Restrict to builds of this branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Restrict to builds in this state: "completed", "successful",
    /// "failed" or "running".
    #[serde(rename = "filter", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Workflow job name to keep when filtering results.
    #[serde(skip)]
    pub job: Option<String>,

    #[serde(flatten)]
    pub pagination: Pagination,
}

impl BuildQuery {
    /// Create a query for a project with the default page.
    pub fn new(username: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            project: project.into(),
            ..Default::default()
        }
    }

    /// Restrict to a branch. Empty names are ignored.
    #[must_use]
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into()).filter(|b: &String| !b.is_empty());
        self
    }

    /// Restrict to a status filter. Empty filters are ignored.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// Keep only builds of this workflow job. Empty names are ignored.
    #[must_use]
    pub fn job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into()).filter(|j: &String| !j.is_empty());
        self
    }

    /// Set the number of builds to request.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.pagination.limit = limit;
        self
    }

    /// Set the index of the first build to request.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.pagination.offset = offset;
        self
    }

    /// Check whether a returned build passes the job filter.
    pub fn accepts(&self, build: &Build) -> bool {
        self.job.as_deref().map_or(true, |job| build.matches_job(job))
    }
}

#[async_trait]
impl List for Build {
    type Query = BuildQuery;

    #[tracing::instrument(skip(client), fields(username = %query.username, project = %query.project))]
    async fn list(client: &CircleClient, query: &Self::Query) -> Result<Vec<Self>> {
        let path = project_path(&query.username, &query.project)?;
        let builds: Vec<Build> = client.get_json(&path, query).await?;
        tracing::debug!(count = builds.len(), "fetched builds");
        Ok(builds)
    }
}

/// List the most recent builds across all followed projects.
#[tracing::instrument(skip(client))]
pub async fn list_recent_builds(client: &CircleClient) -> Result<Vec<Build>> {
    client.get_json("recent-builds", NO_QUERY).await
}

/// Search a project's builds by branch and status.
///
/// Convenience function equivalent to `Build::list(client, query)`.
pub async fn search_builds(client: &CircleClient, query: &BuildQuery) -> Result<Vec<Build>> {
    Build::list(client, query).await
}

/// Find the newest build that has artifacts and passes the query's job
/// filter.
///
/// Only the single page described by the query's pagination is searched.
/// Returns `None` when no build on that page qualifies.
pub async fn find_build_with_artifacts(
    client: &CircleClient,
    query: &BuildQuery,
) -> Result<Option<u64>> {
    let builds = Build::list(client, query).await?;

    Ok(builds
        .iter()
        .find(|b| b.has_artifacts && query.accepts(b))
        .map(|b| b.build_num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_minimal_build_decodes() {
        let builds: Vec<Build> =
            serde_json::from_str(r#"[{"build_num":42,"status":"success"}]"#).unwrap();

        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].build_num, 42);
        assert_eq!(builds[0].status, "success");
        assert!(builds[0].branch.is_empty());
        assert!(!builds[0].has_artifacts);
    }

    #[test]
    fn test_nulls_decode_to_defaults() {
        let build: Build = serde_json::from_value(serde_json::json!({
            "build_num": 7,
            "branch": null,
            "lifecycle": "finished",
            "outcome": null,
            "has_artifacts": null,
            "parallel": null,
            "user": null,
            "workflows": null,
            "pull_requests": null,
            "vcs_tag": null,
            "author_date": null
        }))
        .unwrap();

        assert_eq!(build.build_num, 7);
        assert_eq!(build.branch, "");
        assert_eq!(build.outcome, None);
        assert_eq!(build.parallel, 0);
        assert_eq!(build.workflows, Workflow::default());
        assert!(build.pull_requests.is_empty());
    }

    #[test]
    fn test_full_build_decodes() {
        let build: Build = serde_json::from_value(serde_json::json!({
            "build_num": 1204,
            "reponame": "widgets",
            "username": "acme",
            "branch": "main",
            "status": "failed",
            "outcome": "failed",
            "lifecycle": "finished",
            "vcs_revision": "4f1c2a9",
            "author_name": "Dana Lee",
            "author_email": "dana@example.com",
            "author_date": "2019-05-01T10:11:12Z",
            "committer_date": "2019-05-01T10:11:12.000Z",
            "build_time_millis": 84213,
            "has_artifacts": true,
            "user": { "id": 99, "login": "dlee", "vcs_type": "github", "is_user": true },
            "workflows": {
                "job_id": "a1b2",
                "job_name": "test",
                "workflow_id": "c3d4",
                "workflow_name": "build-and-test",
                "workspace_id": "e5f6",
                "upstream_job_ids": ["z9"],
                "upstream_concurrency_map": {}
            },
            "unknown_field": { "ignored": true }
        }))
        .unwrap();

        assert_eq!(build.reponame, "widgets");
        assert_eq!(build.user.login, "dlee");
        assert_eq!(build.job_name(), "test");
        assert_eq!(build.workflows.workflow_name, "build-and-test");
        assert_eq!(build.workflows.upstream_job_ids, vec!["z9".to_string()]);
        assert!(build.author_date.is_some());
        assert!(build.committer_date.is_some());
        assert!(build.has_artifacts);
    }

    #[test]
    fn test_query_encodes_filters_and_pagination() {
        let query = BuildQuery::new("acme", "widgets")
            .branch("main")
            .status("failed")
            .job("test")
            .limit(10)
            .offset(0);

        let encoded = serde_qs::to_string(&query).unwrap();
        let params: HashMap<String, String> = serde_qs::from_str(&encoded).unwrap();

        assert_eq!(params.len(), 4);
        assert_eq!(params["branch"], "main");
        assert_eq!(params["filter"], "failed");
        assert_eq!(params["limit"], "10");
        assert_eq!(params["offset"], "0");
    }

    #[test]
    fn test_query_omits_empty_filters() {
        let query = BuildQuery::new("acme", "widgets").branch("").status("");
        assert_eq!(query.branch, None);
        assert_eq!(query.status, None);

        let encoded = serde_qs::to_string(&query).unwrap();
        let params: HashMap<String, String> = serde_qs::from_str(&encoded).unwrap();
        assert!(!params.contains_key("branch"));
        assert!(!params.contains_key("filter"));
        assert!(params.contains_key("limit"));
    }

    #[test]
    fn test_accepts_filters_by_job() {
        let mut build = Build::default();
        build.workflows.job_name = "deploy".to_string();

        assert!(BuildQuery::new("a", "b").accepts(&build));
        assert!(BuildQuery::new("a", "b").job("deploy").accepts(&build));
        assert!(!BuildQuery::new("a", "b").job("test").accepts(&build));
    }
}
