//! CircleCI API client library.
//!
//! A Rust library for the CircleCI v1.1 REST API: listing and searching
//! builds, listing build artifacts and downloading them to disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use circleci_api::{ArtifactQuery, Build, BuildQuery, BuildRef, CircleClient, List};
//!
//! #[tokio::main]
//! async fn main() -> circleci_api::Result<()> {
//!     // Create client from environment variables
//!     let client = CircleClient::from_env()?;
//!
//!     // Recent builds across followed projects
//!     let recent = circleci_api::list_recent_builds(&client).await?;
//!     println!("Found {} recent builds", recent.len());
//!
//!     // Failed builds on main
//!     let query = BuildQuery::new("acme", "widgets").branch("main").status("failed");
//!     let builds = Build::list(&client, &query).await?;
//!
//!     // Download the artifacts of the latest build
//!     let query = ArtifactQuery::new("acme", "widgets", BuildRef::Latest);
//!     for artifact in circleci_api::list_artifacts(&client, &query).await? {
//!         circleci_api::download_artifact(&client, &artifact, "out".as_ref()).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every response with a status of 300 or above becomes an [`ApiError`]
//! carrying the status code and the API's message. Transport, decoding and
//! filesystem failures keep their own [`CircleError`] variants.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `CIRCLE_TOKEN` (required) - Your CircleCI API token
//! - `CIRCLE_API_URL` (optional) - Base URL (defaults to `https://circleci.com/api/v1.1/`)

pub mod cli;
mod client;
mod error;
#[cfg(feature = "test-server")]
pub mod mock_server;
mod models;
mod output;
mod pagination;
mod traits;

// Re-export core types
pub use client::{CircleClient, DEFAULT_API_URL, TOKEN_PARAM};
pub use error::{ApiError, CircleError, Result};
pub use pagination::{Pagination, DEFAULT_LIMIT, MAX_LIMIT};

// Re-export traits
pub use traits::List;

// Re-export models
pub use models::{
    // Build types
    Build,
    BuildQuery,
    User,
    Workflow,
    // Artifact types
    Artifact,
    ArtifactQuery,
    BuildRef,
};

// Re-export convenience functions
pub use models::{download_artifact, find_build_with_artifacts, list_artifacts};
pub use models::{list_recent_builds, search_builds};

// Re-export output helpers
pub use output::{render_json, render_table, ArtifactRow, BuildRow, TableRow};
