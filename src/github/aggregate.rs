// src/github/aggregate.rs
// =============================================================================
// This module downloads every issue of a repository together with everything
// hanging off it.
//
// For each issue we fetch, in this order:
//   1. reactions on the issue
//   2. comments (plus per-comment reactions when a comment has any)
//   3. timeline events
//   4. for pull requests only: reviews, review comments, changed files and
//      the full contents of every changed file
//
// The results are attached to the issue's JSON object under new keys, so the
// final issues.json is GitHub's own payload plus our additions. Issues are
// handled one at a time and the first failed request aborts the whole run.
// =============================================================================

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::fetch::ApiClient;
use crate::config::ExportConfig;
use crate::error::{ExportError, Result};

/// Downloads the issues selected by `config` and enriches each one.
///
/// Returns a single-element list when `config.issue` is set.
pub async fn get_issues(client: &ApiClient, config: &ExportConfig) -> Result<Vec<Value>> {
    // Step 1: the base list (or just the one issue)
    let mut issues = match config.issue {
        Some(number) => {
            let url = config.api_endpoint(&format!("repos/{}/issues/{}", config.repo, number));
            vec![client.load_all(&url).await?]
        }
        None => {
            let url = config.api_endpoint(&format!("repos/{}/issues?state=all", config.repo));
            client.load_list(&url).await?
        }
    };

    info!(count = issues.len(), repo = %config.repo, "fetched issue list");

    // Step 2: enrich them one at a time
    for issue in &mut issues {
        enrich_issue(client, config, issue).await?;
    }

    Ok(issues)
}

// Attaches reactions, comments, events and pull request data to one issue
async fn enrich_issue(client: &ApiClient, config: &ExportConfig, issue: &mut Value) -> Result<()> {
    let number = issue_number(issue)?;
    let context = format!("issue #{}", number);
    info!("#{}", number);

    let repo_path = format!("repos/{}", config.repo);

    // Reactions on the issue itself
    let reactions = client
        .load_list(&config.api_endpoint(&format!("{repo_path}/issues/{number}/reactions")))
        .await?;

    // Comments, each with its detailed reactions when it has any
    let comments_url = str_field(issue, "comments_url", &context)?;
    let mut comments = client.load_list(&comments_url).await?;
    for comment in &mut comments {
        attach_comment_reactions(client, comment, &context).await?;
    }

    // Timeline events (labeled, assigned, closed, ...)
    let events_url = str_field(issue, "events_url", &context)?;
    let events = client.load_list(&events_url).await?;

    // Plain issues have no `pull_request` key at all
    let is_pull_request = issue.get("pull_request").is_some_and(|v| !v.is_null());

    // Attach under new keys; existing keys such as the `comments` count are replaced
    let fields = object_mut(issue, &context)?;
    fields.insert("reactions".to_string(), Value::Array(reactions));
    fields.insert("comments".to_string(), Value::Array(comments));
    fields.insert("events".to_string(), Value::Array(events));

    if is_pull_request {
        debug!(number, "issue is a pull request");
        let pulls_path = format!("{repo_path}/pulls/{number}");

        let mut reviews = client
            .load_list(&config.api_endpoint(&format!("{pulls_path}/reviews")))
            .await?;
        // Reviews only carry `submitted_at`; copy it so every feed item has `created_at`
        for review in &mut reviews {
            let submitted_at = review.get("submitted_at").cloned().unwrap_or(Value::Null);
            object_mut(review, &context)?.insert("created_at".to_string(), submitted_at);
        }

        // Comments anchored to lines of changed files
        let review_comments = client
            .load_list(&config.api_endpoint(&format!("{pulls_path}/comments")))
            .await?;

        let mut files = client
            .load_list(&config.api_endpoint(&format!("{pulls_path}/files")))
            .await?;
        // The files endpoint only lists names; fetch each file's full contents
        for file in &mut files {
            let contents_url = str_field(file, "contents_url", &context)?;
            let contents = client.load_all(&contents_url).await?;
            object_mut(file, &context)?.insert("contents".to_string(), contents);
        }

        fields.insert("reviews".to_string(), Value::Array(reviews));
        fields.insert("review_comments".to_string(), Value::Array(review_comments));
        fields.insert("files".to_string(), Value::Array(files));
    }

    Ok(())
}

// Adds `reactions_detailed` to a comment whose reaction summary is nonzero
async fn attach_comment_reactions(client: &ApiClient, comment: &mut Value, context: &str) -> Result<()> {
    // The preview media type always includes the summary; without it the
    // payload is not what we asked for
    let total = comment
        .pointer("/reactions/total_count")
        .and_then(Value::as_u64)
        .ok_or_else(|| ExportError::MissingField {
            field: "reactions.total_count",
            context: format!("comment on {}", context),
        })?;

    // Nothing to fetch
    if total == 0 {
        return Ok(());
    }

    let url = comment
        .pointer("/reactions/url")
        .and_then(Value::as_str)
        .ok_or_else(|| ExportError::MissingField {
            field: "reactions.url",
            context: format!("comment on {}", context),
        })?
        .to_string();

    let detailed = client.load_all(&url).await?;
    object_mut(comment, context)?.insert("reactions_detailed".to_string(), detailed);
    Ok(())
}

fn issue_number(issue: &Value) -> Result<u64> {
    issue
        .get("number")
        .and_then(Value::as_u64)
        .ok_or_else(|| ExportError::MissingField {
            field: "number",
            context: "issue".to_string(),
        })
}

fn str_field(value: &Value, field: &'static str, context: &str) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ExportError::MissingField {
            field,
            context: context.to_string(),
        })
}

fn object_mut<'a>(value: &'a mut Value, context: &str) -> Result<&'a mut Map<String, Value>> {
    value.as_object_mut().ok_or_else(|| ExportError::MissingField {
        field: "<object>",
        context: context.to_string(),
    })
}
