//! Mock server state management.
//!
//! Provides the in-memory data store for the mock CircleCI API server.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{Artifact, Build};

/// A file attached to a build.
#[derive(Debug, Clone)]
pub struct ArtifactFile {
    /// Path relative to the build's artifact root.
    pub path: String,
    /// File contents served by the download route.
    pub contents: Vec<u8>,
}

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Builds indexed by project key ("username/project").
    pub builds: HashMap<String, Vec<Build>>,

    /// Artifact files indexed by project key and build number.
    pub artifacts: HashMap<(String, u64), Vec<ArtifactFile>>,

    /// Optional API token. If set, requests must carry it as `circle-token`.
    pub required_token: Option<String>,

    /// Root URL of the running server, used to build artifact links.
    pub base_url: String,
}

/// Key under which a project's data is stored.
pub fn project_key(username: &str, project: &str) -> String {
    format!("{username}/{project}")
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a build to a project.
    pub fn with_build(mut self, username: &str, project: &str, build: Build) -> Self {
        self.builds
            .entry(project_key(username, project))
            .or_default()
            .push(build);
        self
    }

    /// Attach an artifact file to a build.
    pub fn with_artifact(
        mut self,
        username: &str,
        project: &str,
        build_num: u64,
        path: &str,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        self.artifacts
            .entry((project_key(username, project), build_num))
            .or_default()
            .push(ArtifactFile {
                path: path.to_string(),
                contents: contents.into(),
            });
        self
    }

    /// Set the required API token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Check a request's token against the required one.
    pub fn authorized(&self, token: Option<&str>) -> bool {
        match &self.required_token {
            Some(required) => token == Some(required.as_str()),
            None => true,
        }
    }

    /// Whether the project has any builds.
    pub fn has_project(&self, key: &str) -> bool {
        self.builds.contains_key(key)
    }

    /// All builds of every project, newest first.
    pub fn recent_builds(&self) -> Vec<&Build> {
        let mut builds: Vec<&Build> = self.builds.values().flatten().collect();
        builds.sort_by(|a, b| b.build_num.cmp(&a.build_num));
        builds
    }

    /// Builds of a project, newest first, filtered by branch and status.
    ///
    /// Unknown status filters match nothing.
    pub fn list_builds(&self, key: &str, branch: Option<&str>, filter: Option<&str>) -> Vec<&Build> {
        let mut builds: Vec<&Build> = self
            .builds
            .get(key)
            .map(|b| b.iter().collect())
            .unwrap_or_default();

        builds.retain(|b| branch.map_or(true, |br| b.branch == br));
        builds.retain(|b| filter.map_or(true, |f| matches_filter(b, f)));
        builds.sort_by(|a, b| b.build_num.cmp(&a.build_num));
        builds
    }

    /// Resolve "latest" or a build number to an existing build number.
    pub fn resolve_build(&self, key: &str, build: &str) -> Option<u64> {
        let builds = self.builds.get(key)?;

        if build == "latest" {
            return builds.iter().map(|b| b.build_num).max();
        }

        let num: u64 = build.parse().ok()?;
        builds.iter().any(|b| b.build_num == num).then_some(num)
    }

    /// Artifacts of a build, with download links pointing at this server.
    pub fn list_artifacts(&self, key: &str, build_num: u64) -> Vec<Artifact> {
        self.artifacts
            .get(&(key.to_string(), build_num))
            .map(|files| {
                files
                    .iter()
                    .map(|f| Artifact {
                        path: f.path.clone(),
                        url: format!("{}/files/{}/{}/{}", self.base_url, key, build_num, f.path),
                        pretty_path: Some(f.path.clone()),
                        node_index: Some(0),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Contents of one artifact file.
    pub fn artifact_contents(&self, key: &str, build_num: u64, path: &str) -> Option<&[u8]> {
        self.artifacts
            .get(&(key.to_string(), build_num))?
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.contents.as_slice())
    }
}

fn matches_filter(build: &Build, filter: &str) -> bool {
    let outcome = build.outcome.as_deref().unwrap_or_default();
    match filter {
        "completed" => build.lifecycle == "finished",
        "successful" => outcome == "success",
        "failed" => matches!(outcome, "failed" | "infrastructure_fail" | "timedout"),
        "running" => build.lifecycle == "running",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(num: u64, branch: &str, lifecycle: &str, outcome: Option<&str>) -> Build {
        Build {
            build_num: num,
            branch: branch.to_string(),
            lifecycle: lifecycle.to_string(),
            outcome: outcome.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_state_lists_newest_first() {
        let state = MockState::new()
            .with_build("acme", "widgets", build(1, "main", "finished", Some("success")))
            .with_build("acme", "widgets", build(3, "main", "finished", Some("failed")))
            .with_build("acme", "widgets", build(2, "dev", "running", None));

        let nums: Vec<u64> = state
            .list_builds("acme/widgets", None, None)
            .iter()
            .map(|b| b.build_num)
            .collect();
        assert_eq!(nums, vec![3, 2, 1]);
    }

    #[test]
    fn test_state_filters_branch_and_status() {
        let state = MockState::new()
            .with_build("acme", "widgets", build(1, "main", "finished", Some("success")))
            .with_build("acme", "widgets", build(3, "main", "finished", Some("failed")))
            .with_build("acme", "widgets", build(2, "dev", "running", None));

        assert_eq!(state.list_builds("acme/widgets", Some("main"), None).len(), 2);
        assert_eq!(state.list_builds("acme/widgets", None, Some("running")).len(), 1);
        assert_eq!(state.list_builds("acme/widgets", Some("main"), Some("failed")).len(), 1);
        assert_eq!(state.list_builds("acme/widgets", None, Some("completed")).len(), 2);
        assert!(state.list_builds("acme/widgets", None, Some("bogus")).is_empty());
    }

    #[test]
    fn test_state_resolves_latest() {
        let state = MockState::new()
            .with_build("acme", "widgets", build(4, "main", "finished", Some("success")))
            .with_build("acme", "widgets", build(9, "main", "finished", Some("success")));

        assert_eq!(state.resolve_build("acme/widgets", "latest"), Some(9));
        assert_eq!(state.resolve_build("acme/widgets", "4"), Some(4));
        assert_eq!(state.resolve_build("acme/widgets", "5"), None);
        assert_eq!(state.resolve_build("acme/other", "latest"), None);
    }

    #[test]
    fn test_state_artifact_links() {
        let mut state = MockState::new().with_artifact("acme", "widgets", 4, "a/b.txt", "hi");
        state.base_url = "http://127.0.0.1:9".to_string();

        let artifacts = state.list_artifacts("acme/widgets", 4);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].url, "http://127.0.0.1:9/files/acme/widgets/4/a/b.txt");
        assert_eq!(
            state.artifact_contents("acme/widgets", 4, "a/b.txt"),
            Some(&b"hi"[..])
        );
    }

    #[test]
    fn test_state_token_check() {
        let open = MockState::new();
        assert!(open.authorized(None));

        let locked = MockState::new().with_required_token("secret");
        assert!(!locked.authorized(None));
        assert!(!locked.authorized(Some("wrong")));
        assert!(locked.authorized(Some("secret")));
    }
}
