// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands share the same options:
//   issue-export repo  <owner/name>           export every issue
//   issue-export issue <owner/name> <number>  export a single issue
//
// Rust concepts:
// - Derive macros: clap generates the parser from these structs
// - #[command(flatten)]: Reuses one struct of options in several subcommands
// - env = "...": Falls back to an environment variable when the flag is absent
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::config::{ExportConfig, RepoId, DEFAULT_API_URL};

#[derive(Parser, Debug)]
#[command(
    name = "issue-export",
    version,
    about = "Export GitHub issues to JSON and Markdown",
    long_about = "issue-export downloads the issues of a GitHub repository together with their \
                  comments, events, reactions, reviews and attached images, then writes a raw \
                  JSON dump and a Markdown page that mimics GitHub's issue view."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every issue and pull request of a repository
    ///
    /// Example: issue-export repo rust-lang/rust
    Repo {
        /// Repository as owner/name or https://github.com/owner/name
        repo: RepoId,

        #[command(flatten)]
        options: ExportOptions,
    },

    /// Export a single issue or pull request
    ///
    /// Example: issue-export issue acme/widgets 42
    Issue {
        /// Repository as owner/name or https://github.com/owner/name
        repo: RepoId,

        /// Issue or pull request number
        number: u64,

        #[command(flatten)]
        options: ExportOptions,
    },
}

/// Options shared by both subcommands.
#[derive(Args, Debug)]
pub struct ExportOptions {
    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Output folder (default: <owner>_<name>_issues)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Base URL of the GitHub API, for GitHub Enterprise
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: Url,

    /// Don't download images attached to issues
    #[arg(long)]
    pub skip_images: bool,

    /// Download attached images from this mirror instead of the GitHub CDN
    ///
    /// The CDN subdomain becomes the first path segment, e.g.
    /// <mirror>/user-images/123/abc.png
    #[arg(long)]
    pub image_mirror: Option<Url>,
}

impl Commands {
    /// Turns the parsed arguments into the config every export step uses.
    pub fn into_config(self) -> ExportConfig {
        let (repo, issue, options) = match self {
            Commands::Repo { repo, options } => (repo, None, options),
            Commands::Issue { repo, number, options } => (repo, Some(number), options),
        };

        let mut config = ExportConfig::new(options.token, repo, issue)
            .with_api_url(options.api_url)
            .with_images(!options.skip_images)
            .with_image_mirror(options.image_mirror);
        if let Some(output) = options.output {
            config = config.with_output_dir(output);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_command_defaults() {
        let cli = Cli::try_parse_from(["issue-export", "repo", "acme/widgets", "--token", "t"]).unwrap();
        let config = cli.command.into_config();

        assert_eq!(config.repo.to_string(), "acme/widgets");
        assert_eq!(config.issue, None);
        assert_eq!(config.token, "t");
        assert_eq!(config.api_url.as_str(), "https://api.github.com/");
        assert_eq!(config.output_dir, PathBuf::from("acme_widgets_issues"));
        assert!(config.download_images);
        assert!(config.image_mirror.is_none());
    }

    #[test]
    fn test_issue_command_with_options() {
        let cli = Cli::try_parse_from([
            "issue-export",
            "issue",
            "https://github.com/acme/widgets",
            "42",
            "--token",
            "t",
            "--output",
            "dump",
            "--api-url",
            "https://ghe.example.com/api/v3",
            "--skip-images",
            "--image-mirror",
            "http://mirror.example.com/",
        ])
        .unwrap();
        let config = cli.command.into_config();

        assert_eq!(config.issue, Some(42));
        assert_eq!(config.output_dir, PathBuf::from("dump"));
        assert_eq!(config.output_stem(), "42");
        assert_eq!(
            config.api_endpoint("repos/acme/widgets/issues/42"),
            "https://ghe.example.com/api/v3/repos/acme/widgets/issues/42"
        );
        assert!(!config.download_images);
        assert_eq!(
            config.image_mirror.as_ref().map(Url::as_str),
            Some("http://mirror.example.com/")
        );
    }

    #[test]
    fn test_rejects_bad_repository() {
        let result = Cli::try_parse_from(["issue-export", "repo", "widgets", "--token", "t"]);
        assert!(result.is_err());
    }
}
