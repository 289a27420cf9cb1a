// src/export.rs
// =============================================================================
// Runs one export from start to finish.
//
// Steps, in order:
// 1. Create the output folder
// 2. Download the issues and everything attached to them
// 3. Decode them into typed records (fails early on unexpected payloads)
// 4. Download embedded images
// 5. Write <name>.json (GitHub's payloads, pretty-printed)
// 6. Write <name>.md (the rendered document)
//
// If any step fails we stop right there. The folder may already exist, but
// the JSON and Markdown files are only written once everything was fetched.
// =============================================================================

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::info;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::github::{self, ApiClient};
use crate::images;
use crate::model;
use crate::render;

/// What an export produced.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub issues: usize,
    pub images: usize,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

pub async fn run_export(config: &ExportConfig) -> Result<ExportSummary> {
    // Step 1: output folder (fine if it already exists)
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| ExportError::io(&config.output_dir, e))?;

    let client = ApiClient::new(config)?;

    // Steps 2 and 3: fetch, then decode before anything is written
    println!("📥 Downloading issues...");
    let raw = github::get_issues(&client, config).await?;
    let issues = model::decode_issues(&raw)?;

    // Step 4: images, unless --skip-images
    let image_count = if config.download_images {
        println!("🖼️  Downloading images attached to issues...");
        images::download_embedded_images(
            client.http(),
            &raw,
            &config.output_dir,
            config.image_mirror.as_ref(),
        )
        .await?
    } else {
        0
    };

    // "issues" for a whole repository, the number for one issue
    let stem = config.output_stem();

    // Step 5: the raw aggregate, exactly as GitHub sent it plus our keys
    println!("💾 Saving JSON...");
    let json_path = config.output_dir.join(format!("{}.json", stem));
    write_file(&json_path, &to_pretty_json(&raw)?).await?;

    // Step 6: the rendered page; title and TOC only for whole repositories
    println!("📝 Saving Markdown...");
    let markdown = render::build_markdown(&config.repo, &issues, config.issue.is_none())?;
    let markdown_path = config.output_dir.join(format!("{}.md", stem));
    write_file(&markdown_path, markdown.as_bytes()).await?;

    info!(issues = issues.len(), images = image_count, "export finished");

    Ok(ExportSummary {
        issues: issues.len(),
        images: image_count,
        json_path,
        markdown_path,
    })
}

// Pretty-printed with four-space indentation
fn to_pretty_json(data: &[Value]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut serializer).map_err(|source| ExportError::Decode {
        context: "aggregated issues".to_string(),
        source,
    })?;
    Ok(out)
}

// tokio::fs::write opens, writes and closes the file in one call
async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| ExportError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoId;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_json(server: &MockServer, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_single_issue_export_writes_both_files() {
        let server = MockServer::start().await;
        let uri = server.uri();

        mount_json(
            &server,
            "/repos/acme/widgets/issues/42",
            json!({
                "number": 42,
                "title": "Crash on startup",
                "state": "open",
                "body": "It crashes.",
                "user": {"login": "alice"},
                "created_at": "2019-12-31T00:00:00Z",
                "closed_at": null,
                "comments_url": format!("{uri}/repos/acme/widgets/issues/42/comments"),
                "events_url": format!("{uri}/repos/acme/widgets/issues/42/events"),
            }),
        )
        .await;
        mount_json(&server, "/repos/acme/widgets/issues/42/reactions", json!([])).await;
        mount_json(
            &server,
            "/repos/acme/widgets/issues/42/comments",
            json!([{
                "user": {"login": "bob"},
                "body": "Can confirm.",
                "created_at": "2020-01-01T00:00:00Z",
                "reactions": {"total_count": 0}
            }]),
        )
        .await;
        mount_json(&server, "/repos/acme/widgets/issues/42/events", json!([])).await;

        let dir = tempfile::tempdir().unwrap();
        let repo: RepoId = "acme/widgets".parse().unwrap();
        let config = ExportConfig::new("token", repo, Some(42))
            .with_api_url(Url::parse(&uri).unwrap())
            .with_output_dir(dir.path().join("out"));

        let summary = run_export(&config).await.unwrap();

        assert_eq!(summary.issues, 1);
        assert_eq!(summary.images, 0);
        assert_eq!(summary.json_path, dir.path().join("out").join("42.json"));
        assert_eq!(summary.markdown_path, dir.path().join("out").join("42.md"));

        let json_text = std::fs::read_to_string(&summary.json_path).unwrap();
        assert!(json_text.starts_with("[\n    {\n        \"number\": 42,"));
        let dumped: Value = serde_json::from_str(&json_text).unwrap();
        assert_eq!(dumped[0]["comments"][0]["body"], "Can confirm.");

        let markdown = std::fs::read_to_string(&summary.markdown_path).unwrap();
        assert!(markdown.contains("#42: Crash on startup (open)"));
        assert!(markdown.contains("#### (2020-01-01T00:00:00Z) bob:\nCan confirm."));
    }

    #[tokio::test]
    async fn test_failure_leaves_no_output_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let repo: RepoId = "acme/widgets".parse().unwrap();
        let config = ExportConfig::new("bad-token", repo, None)
            .with_api_url(Url::parse(&server.uri()).unwrap())
            .with_output_dir(&out);

        let err = run_export(&config).await.unwrap_err();

        assert!(matches!(err, ExportError::RemoteRequest { status: 401, .. }));
        assert!(out.is_dir());
        assert!(!out.join("issues.json").exists());
        assert!(!out.join("issues.md").exists());
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let bytes = to_pretty_json(&[json!({"a": 1})]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "[\n    {\n        \"a\": 1\n    }\n]");
    }
}
