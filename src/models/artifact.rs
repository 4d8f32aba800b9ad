//! Artifact model, listing and download.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use serde_with::{serde_as, DefaultOnNull};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::client::CircleClient;
use crate::error::{CircleError, Result};
use crate::models::project_path;
use crate::traits::List;

/// A file uploaded by a build.
///
/// Missing or `null` fields decode as empty; an artifact without a path or
/// URL is listed but cannot be downloaded.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artifact {
    /// Path of the file relative to the build's artifact root.
    #[serde_as(as = "DefaultOnNull")]
    pub path: String,

    /// Fully qualified download URL.
    #[serde_as(as = "DefaultOnNull")]
    pub url: String,

    /// Path as shown in the web UI.
    pub pretty_path: Option<String>,

    /// Index of the parallel container that produced the file.
    pub node_index: Option<u32>,
}

/// Reference to a build within a project: a build number or the latest build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildRef {
    #[default]
    Latest,
    Number(u64),
}

impl From<u64> for BuildRef {
    /// Build number `0` means "not specified" and selects the latest build.
    fn from(num: u64) -> Self {
        match num {
            0 => Self::Latest,
            n => Self::Number(n),
        }
    }
}

impl fmt::Display for BuildRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for BuildRef {
    type Err = CircleError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        s.parse::<u64>().map(Self::from).map_err(|_| {
            CircleError::InvalidQuery(format!(
                "build must be a build number or 'latest', got '{s}'"
            ))
        })
    }
}

impl Serialize for BuildRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Query identifying the build whose artifacts to list.
#[derive(Debug, Clone, Default)]
pub struct ArtifactQuery {
    pub username: String,
    pub project: String,
    pub build: BuildRef,
}

impl ArtifactQuery {
    /// Create a query for a build; `0` selects the latest build.
    pub fn new(
        username: impl Into<String>,
        project: impl Into<String>,
        build: impl Into<BuildRef>,
    ) -> Self {
        Self {
            username: username.into(),
            project: project.into(),
            build: build.into(),
        }
    }
}

impl Artifact {
    /// Where this artifact lands under `dir`.
    ///
    /// Root and `.` components of the artifact path are dropped; `..`
    /// components are rejected so the file cannot escape `dir`.
    pub fn destination(&self, dir: &Path) -> Result<PathBuf> {
        let mut destination = dir.to_path_buf();
        let mut pushed = false;

        for component in Path::new(&self.path).components() {
            match component {
                Component::Normal(part) => {
                    destination.push(part);
                    pushed = true;
                }
                Component::ParentDir => {
                    return Err(CircleError::InvalidArtifactPath(self.path.clone()));
                }
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }

        if !pushed {
            return Err(CircleError::InvalidArtifactPath(self.path.clone()));
        }
        Ok(destination)
    }

    /// Download the artifact into `dir`, creating parent directories.
    ///
    /// An existing file at the destination is overwritten. If writing fails
    /// midway, the bytes written so far are left on disk.
    #[tracing::instrument(skip(self, client), fields(path = %self.path))]
    pub async fn download(&self, client: &CircleClient, dir: &Path) -> Result<PathBuf> {
        let destination = self.destination(dir)?;
        if self.url.is_empty() {
            return Err(CircleError::InvalidQuery(format!(
                "artifact '{}' has no download URL",
                self.path
            )));
        }
        let mut response = client.get(&self.url).await?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&destination).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await.map_err(CircleError::HttpError)? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(bytes = written, destination = %destination.display(), "artifact saved");
        Ok(destination)
    }
}

#[async_trait]
impl List for Artifact {
    type Query = ArtifactQuery;

    #[tracing::instrument(skip(client))]
    async fn list(client: &CircleClient, query: &Self::Query) -> Result<Vec<Self>> {
        let path = format!(
            "{}/{}/artifacts",
            project_path(&query.username, &query.project)?,
            query.build
        );
        client.get_json(&path, crate::client::NO_QUERY).await
    }
}

/// List the artifacts of a build.
///
/// Convenience function equivalent to `Artifact::list(client, query)`.
pub async fn list_artifacts(client: &CircleClient, query: &ArtifactQuery) -> Result<Vec<Artifact>> {
    Artifact::list(client, query).await
}

/// Download an artifact into `dir`, returning the path written.
pub async fn download_artifact(
    client: &CircleClient,
    artifact: &Artifact,
    dir: &Path,
) -> Result<PathBuf> {
    artifact.download(client, dir).await
}
