//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{TimeZone, Utc};

use super::state::MockState;
use crate::{Build, User, Workflow};

/// Token required by the default scenario.
pub const DEFAULT_TOKEN: &str = "test-token";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// Create a finished build with the given outcome.
    pub fn finished_build(
        username: &str,
        project: &str,
        build_num: u64,
        branch: &str,
        outcome: &str,
        job: &str,
    ) -> Build {
        let status = match outcome {
            "success" => "success",
            "canceled" => "canceled",
            _ => "failed",
        };

        Build {
            build_num,
            reponame: project.to_string(),
            username: username.to_string(),
            branch: branch.to_string(),
            status: status.to_string(),
            outcome: Some(outcome.to_string()),
            lifecycle: "finished".to_string(),
            vcs_revision: format!("{build_num:07x}"),
            vcs_url: format!("https://github.com/{username}/{project}"),
            build_url: format!("https://circleci.com/gh/{username}/{project}/{build_num}"),
            subject: Some(format!("Commit for build {build_num}")),
            why: Some("github".to_string()),
            author_name: Some("Dana Lee".to_string()),
            author_email: Some("dana@example.com".to_string()),
            author_date: Utc.with_ymd_and_hms(2019, 5, 1, 10, 0, 0).single(),
            build_time_millis: Some(60_000 + build_num),
            parallel: 1,
            platform: Some("2.0".to_string()),
            user: User {
                login: "dlee".to_string(),
                vcs_type: Some("github".to_string()),
                is_user: true,
                ..Default::default()
            },
            workflows: Workflow {
                job_name: job.to_string(),
                job_id: format!("job-{build_num}"),
                workflow_name: "build-and-test".to_string(),
                workflow_id: format!("wf-{build_num}"),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create a build that is still running.
    pub fn running_build(
        username: &str,
        project: &str,
        build_num: u64,
        branch: &str,
        job: &str,
    ) -> Build {
        let mut build = Self::finished_build(username, project, build_num, branch, "success", job);
        build.status = "running".to_string();
        build.outcome = None;
        build.lifecycle = "running".to_string();
        build.build_time_millis = None;
        build
    }

    /// Mark a build as having uploaded artifacts.
    pub fn with_artifacts(mut build: Build) -> Build {
        build.has_artifacts = true;
        build
    }

    /// The default scenario served by [`super::MockServer::start`].
    ///
    /// `acme/widgets` has builds 100-103 (103 running, 102 failed with
    /// artifacts, 101 successful with artifacts, 100 on another branch);
    /// `acme/gadgets` has a single successful build 7.
    pub fn default_scenario() -> MockState {
        MockState::new()
            .with_required_token(DEFAULT_TOKEN)
            .with_build(
                "acme",
                "widgets",
                Self::running_build("acme", "widgets", 103, "main", "deploy"),
            )
            .with_build(
                "acme",
                "widgets",
                Self::with_artifacts(Self::finished_build(
                    "acme", "widgets", 102, "main", "failed", "test",
                )),
            )
            .with_build(
                "acme",
                "widgets",
                Self::with_artifacts(Self::finished_build(
                    "acme", "widgets", 101, "main", "success", "test",
                )),
            )
            .with_build(
                "acme",
                "widgets",
                Self::finished_build("acme", "widgets", 100, "feature/login", "success", "build"),
            )
            .with_build(
                "acme",
                "gadgets",
                Self::finished_build("acme", "gadgets", 7, "main", "success", "test"),
            )
            .with_artifact(
                "acme",
                "widgets",
                102,
                "reports/junit.xml",
                "<testsuite tests=\"3\" failures=\"1\"/>",
            )
            .with_artifact(
                "acme",
                "widgets",
                102,
                "coverage/html/index.html",
                "<html>coverage</html>",
            )
            .with_artifact(
                "acme",
                "widgets",
                101,
                "reports/junit.xml",
                "<testsuite tests=\"3\" failures=\"0\"/>",
            )
    }
}
