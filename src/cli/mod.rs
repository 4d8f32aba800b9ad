//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! circleci binary. Every option can also be set from a `CIRCLE_*`
//! environment variable.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::client::DEFAULT_API_URL;
use crate::models::{BuildQuery, BuildRef};
use crate::pagination::{DEFAULT_LIMIT, MAX_LIMIT};

/// CircleCI API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "circleci", about = "CircleCI API CLI", version)]
pub struct Cli {
    /// API token used to authenticate every request.
    #[arg(long, env = "CIRCLE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the v1.1 API.
    #[arg(long, env = "CIRCLE_API_URL", global = true, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Work with CircleCI jobs.
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },

    /// Work with a project's builds.
    Build {
        #[command(subcommand)]
        command: BuildCommand,
    },

    /// Work with a job's artifacts.
    Artifact {
        #[command(subcommand)]
        command: ArtifactCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// List all recent jobs.
    List,

    /// Search for recent jobs of a project.
    Search(SearchArgs),
}

#[derive(Subcommand, Debug)]
pub enum BuildCommand {
    /// List recent builds of a project, optionally for one job.
    List(BuildListArgs),
}

#[derive(Subcommand, Debug)]
pub enum ArtifactCommand {
    /// List all artifacts for a job's build.
    List(ArtifactArgs),

    /// Download all artifacts for a job's build.
    Download(DownloadArgs),
}

/// Coordinates of a project.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// The username or organization name that owns the project.
    #[arg(long, env = "CIRCLE_USERNAME")]
    pub username: String,

    /// The project name.
    #[arg(long, env = "CIRCLE_PROJECT")]
    pub project: String,

    /// A branch name for this project.
    #[arg(long, env = "CIRCLE_BRANCH", default_value = "master")]
    pub branch: String,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Restricts which builds are returned (completed, successful, failed, running).
    #[arg(long, env = "CIRCLE_STATUS")]
    pub status: Option<String>,

    /// The API returns builds starting from this offset.
    #[arg(long, env = "CIRCLE_OFFSET", default_value_t = 0)]
    pub offset: u32,

    /// The number of builds to return. Maximum 100.
    #[arg(long, env = "CIRCLE_LIMIT", default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,
}

#[derive(Args, Debug, Clone)]
pub struct BuildListArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Only show builds of this workflow job.
    #[arg(long, env = "CIRCLE_JOB")]
    pub job: Option<String>,

    /// Restricts which builds are returned (completed, successful, failed, running).
    #[arg(long, env = "CIRCLE_STATUS")]
    pub status: Option<String>,

    /// The API returns builds starting from this offset.
    #[arg(long, env = "CIRCLE_OFFSET", default_value_t = 0)]
    pub offset: u32,

    /// The number of builds to return. Maximum 100.
    #[arg(long, env = "CIRCLE_LIMIT", default_value_t = MAX_LIMIT)]
    pub limit: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// A job name.
    #[arg(long, env = "CIRCLE_JOB")]
    pub job: String,

    /// Build number or "latest" (0 also means latest). When omitted, the
    /// newest build of the job with artifacts is used.
    #[arg(long, env = "CIRCLE_BUILD")]
    pub build: Option<BuildRef>,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Directory where to store the artifacts.
    #[arg(long, env = "CIRCLE_ARTIFACT_DIR", default_value = ".")]
    pub directory: PathBuf,
}

impl SearchArgs {
    pub fn to_query(&self) -> BuildQuery {
        BuildQuery::new(&self.project.username, &self.project.project)
            .branch(&self.project.branch)
            .status(self.status.clone().unwrap_or_default())
            .limit(self.limit)
            .offset(self.offset)
    }
}

impl BuildListArgs {
    pub fn to_query(&self) -> BuildQuery {
        BuildQuery::new(&self.project.username, &self.project.project)
            .branch(&self.project.branch)
            .status(self.status.clone().unwrap_or_default())
            .job(self.job.clone().unwrap_or_default())
            .limit(self.limit)
            .offset(self.offset)
    }
}

impl ArtifactArgs {
    /// Query used to find the newest build of the job that has artifacts.
    pub fn to_search_query(&self) -> BuildQuery {
        BuildQuery::new(&self.project.username, &self.project.project)
            .branch(&self.project.branch)
            .job(&self.job)
            .limit(MAX_LIMIT)
            .offset(0)
    }
}
