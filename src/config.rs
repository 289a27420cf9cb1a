// src/config.rs
// =============================================================================
// This module holds the settings for one export run.
//
// Everything the fetcher, image downloader and renderer need to know lives
// in one ExportConfig value that main.rs builds from the command line and
// then hands to each step. Nothing is stored in globals, which means tests
// can build their own config pointing at a mock server.
//
// Rust concepts:
// - FromStr: Lets us write "owner/name".parse::<RepoId>()
// - Display: Lets us print a RepoId with {} in format strings
// =============================================================================

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::error::{ExportError, Result};

/// The public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

// A repository identifier like "rust-lang/rust"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// The default output folder for this repository, e.g. `acme_widgets_issues`.
    pub fn default_output_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}_{}_issues", self.owner, self.name))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// Parses a repository identifier
//
// Supported formats:
//   - owner/repo
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - github.com/owner/repo
impl FromStr for RepoId {
    type Err = ExportError;

    fn from_str(input: &str) -> Result<Self> {
        // Remove common prefixes
        let path = input
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("www.")
            .trim_start_matches("github.com/")
            .trim_end_matches('/');

        let parts: Vec<&str> = path.split('/').collect();

        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(ExportError::InvalidRepository(input.to_string()));
        }

        Ok(RepoId {
            owner: parts[0].to_string(),
            name: parts[1].trim_end_matches(".git").to_string(),
        })
    }
}

/// Everything one export run needs.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Personal access token sent as a bearer credential.
    pub token: String,
    pub repo: RepoId,
    /// Export only this issue instead of the whole repository.
    pub issue: Option<u64>,
    /// Base URL of the REST API (GitHub Enterprise or a test server).
    pub api_url: Url,
    pub output_dir: PathBuf,
    pub download_images: bool,
    /// Fetch attached images from here instead of the GitHub CDN hosts.
    pub image_mirror: Option<Url>,
}

impl ExportConfig {
    // Creates a config with the defaults: public API, default output folder,
    // images enabled
    pub fn new(token: impl Into<String>, repo: RepoId, issue: Option<u64>) -> Self {
        let output_dir = repo.default_output_dir();
        ExportConfig {
            token: token.into(),
            repo,
            issue,
            // A constant that is known to parse
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            output_dir,
            download_images: true,
            image_mirror: None,
        }
    }

    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_images(mut self, download_images: bool) -> Self {
        self.download_images = download_images;
        self
    }

    pub fn with_image_mirror(mut self, image_mirror: Option<Url>) -> Self {
        self.image_mirror = image_mirror;
        self
    }

    /// File stem for the JSON and Markdown outputs: `issues`, or the issue number.
    pub fn output_stem(&self) -> String {
        match self.issue {
            Some(number) => number.to_string(),
            None => "issues".to_string(),
        }
    }

    /// Builds an API URL from the base and a path like `repos/a/b/issues`.
    pub fn api_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.as_str().trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_name() {
        let repo: RepoId = "acme/widgets".parse().unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
        assert_eq!(repo.to_string(), "acme/widgets");
    }

    #[test]
    fn test_parse_github_url_with_git() {
        let repo: RepoId = "https://github.com/user/repo.git".parse().unwrap();
        assert_eq!(repo.owner, "user");
        assert_eq!(repo.name, "repo");
    }

    #[test]
    fn test_parse_invalid_repo() {
        assert!("widgets".parse::<RepoId>().is_err());
        assert!("a/b/c".parse::<RepoId>().is_err());
        assert!("/widgets".parse::<RepoId>().is_err());
    }

    #[test]
    fn test_output_naming() {
        let repo: RepoId = "acme/widgets".parse().unwrap();
        let config = ExportConfig::new("t", repo.clone(), None);
        assert_eq!(config.output_dir, PathBuf::from("acme_widgets_issues"));
        assert_eq!(config.output_stem(), "issues");

        let single = ExportConfig::new("t", repo, Some(42));
        assert_eq!(single.output_stem(), "42");
    }

    #[test]
    fn test_api_endpoint_ignores_trailing_slash() {
        let repo: RepoId = "acme/widgets".parse().unwrap();
        let config = ExportConfig::new("t", repo, None)
            .with_api_url(Url::parse("http://127.0.0.1:8080/").unwrap());
        assert_eq!(
            config.api_endpoint("repos/acme/widgets/issues"),
            "http://127.0.0.1:8080/repos/acme/widgets/issues"
        );
    }
}
