// src/render/files.rs
// =============================================================================
// Renders the Markdown files changed by a pull request, with review comments
// placed right under the line they point at.
//
// How it works:
// 1. Keep only files whose name ends in ".md"
// 2. Group that file's review comments by line number
// 3. Walk the file line by line, remembering whether we are inside a ```
//    fenced block
// 4. After a commented line, close the fence (if open), print the comments
//    as block quotes, then reopen the fence with its original opening line
//
// Step 4 keeps the quotes out of the code block without changing whether
// the rest of the file is inside or outside a fence.
//
// Rust concepts:
// - BTreeMap: A sorted map from line number to comments
// - Option<&str>: "Which fence line opened the current block, if any"
// =============================================================================

use std::collections::BTreeMap;

use super::markdown::{blockquote, header, paragraph, rule};
use crate::error::Result;
use crate::model::{format_timestamp, ChangedFile, PullRequest, ReviewComment};

/// Renders the `Files` section of a pull request into `lines`.
pub fn render_files(pull_request: &PullRequest, lines: &mut Vec<String>) -> Result<()> {
    lines.push(header("Files", 2, None));

    for file in &pull_request.files {
        if !file.contents.name.ends_with(".md") {
            continue;
        }
        render_file(file, &pull_request.review_comments, lines)?;
    }

    Ok(())
}

fn render_file(file: &ChangedFile, review_comments: &[ReviewComment], lines: &mut Vec<String>) -> Result<()> {
    let path = &file.contents.path;
    lines.push(paragraph(&format!("`{}`", path)));

    let text = file.contents.text()?;

    // Comments on this file, keyed by line, in the order GitHub returned them
    let mut comments: BTreeMap<u64, Vec<&ReviewComment>> = BTreeMap::new();
    for comment in review_comments.iter().filter(|c| &c.path == path) {
        if let Some(line) = comment.line {
            comments.entry(line).or_default().push(comment);
        }
    }

    // The line that opened the current fenced block, if we are inside one
    let mut open_fence: Option<&str> = None;

    // Review comment line numbers count \n-separated lines, like GitHub's diff view
    for (index, line) in text.lines().enumerate() {
        let number = index as u64 + 1;

        if line.starts_with("```") {
            open_fence = match open_fence {
                None => Some(line),
                Some(_) => None,
            };
        }
        lines.push(line.to_string());

        let Some(line_comments) = comments.get(&number) else {
            continue;
        };

        if open_fence.is_some() {
            lines.push("```".to_string());
        }
        for comment in line_comments {
            lines.push(blockquote(&rule()));
            lines.push(blockquote(&header(
                &format!("({}) {}:", format_timestamp(&comment.created_at), comment.user.login),
                4,
                None,
            )));
            lines.push(blockquote(&comment.body));
        }
        if let Some(fence) = open_fence {
            lines.push(fence.to_string());
        }
    }

    lines.push(rule());
    Ok(())
}
