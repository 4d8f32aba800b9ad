//! CircleCI API model types.

mod artifact;
mod build;

pub use artifact::*;
pub use build::*;

use crate::error::{CircleError, Result};

/// Path of a GitHub project's endpoints, relative to the API base.
pub(crate) fn project_path(username: &str, project: &str) -> Result<String> {
    if username.is_empty() {
        return Err(CircleError::InvalidQuery("username is required".to_string()));
    }
    if project.is_empty() {
        return Err(CircleError::InvalidQuery("project is required".to_string()));
    }

    Ok(format!(
        "project/github/{}/{}",
        urlencoding::encode(username),
        urlencoding::encode(project)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_path() {
        assert_eq!(
            project_path("acme", "widgets").unwrap(),
            "project/github/acme/widgets"
        );
    }

    #[test]
    fn test_project_path_encodes_segments() {
        assert_eq!(
            project_path("acme", "my project").unwrap(),
            "project/github/acme/my%20project"
        );
    }

    #[test]
    fn test_project_path_requires_coordinates() {
        assert!(matches!(
            project_path("", "widgets"),
            Err(CircleError::InvalidQuery(_))
        ));
        assert!(matches!(
            project_path("acme", ""),
            Err(CircleError::InvalidQuery(_))
        ));
    }
}
