// src/render/document.rs
// =============================================================================
// Builds the Markdown document for a set of issues.
//
// Layout:
//   <repo> Issues                  (whole-repository export only)
//   * [1: title](#1)               (table of contents, same condition)
//   #1: title (state)              (one section per issue, by number)
//   Opened ... by ...
//   <body>
//   Files                          (pull requests: changed .md files)
//   Comments                       (comments, events and reviews by time)
// =============================================================================

use super::files::render_files;
use super::markdown::{header, paragraph, rule};
use crate::config::RepoId;
use crate::error::Result;
use crate::model::{format_timestamp, Activity, EventKind, Issue, Reaction};

/// Renders `issues` as one Markdown document.
///
/// With `full_repository` set, adds a title, a table of contents and an
/// anchor on every issue header.
pub fn build_markdown(repo: &RepoId, issues: &[Issue], full_repository: bool) -> Result<String> {
    // GitHub lists newest first; the document goes by number
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by_key(|issue| issue.number);

    let mut lines = Vec::new();

    if full_repository {
        lines.push(header(&format!("{} Issues", repo), 1, None));
        for issue in &sorted {
            lines.push(toc_entry(issue));
            lines.push(String::new());
        }
    }

    for issue in sorted {
        render_issue(issue, full_repository, &mut lines)?;
    }

    Ok(lines.join("\n"))
}

/// The anchor name for an issue. The table of contents links to `#<anchor>`.
pub fn anchor(issue: &Issue) -> String {
    issue.number.to_string()
}

fn toc_entry(issue: &Issue) -> String {
    format!("* [{}: {}](#{})", issue.number, issue.title, anchor(issue))
}

fn render_issue(issue: &Issue, with_anchor: bool, lines: &mut Vec<String>) -> Result<()> {
    let link = with_anchor.then(|| anchor(issue));
    lines.push(header(
        &format!("#{}: {} ({})", issue.number, issue.title, issue.state),
        2,
        link.as_deref(),
    ));

    // "Opened ... by ..." plus ", closed ..." for closed issues
    let closed = match &issue.closed_at {
        Some(closed_at) => format!(", closed {}", format_timestamp(closed_at)),
        None => String::new(),
    };
    lines.push(paragraph(&format!(
        "Opened {} by {}{}",
        format_timestamp(&issue.created_at),
        issue.user.login,
        closed
    )));
    // A null body still gets its (empty) paragraph
    lines.push(paragraph(issue.body.as_deref().unwrap_or("")));
    if let Some(summary) = reaction_summary(&issue.reactions) {
        lines.push(paragraph(&summary));
    }

    if let Some(pull_request) = &issue.pull_request {
        render_files(pull_request, lines)?;
    }

    lines.push(header("Comments", 2, None));
    render_activity(&issue.activity, lines);
    Ok(())
}

// Renders the activity feed, with a rule between items but not before the first
fn render_activity(activity: &[Activity], lines: &mut Vec<String>) {
    let mut is_first_item = true;

    for item in activity {
        // Comments and reviews with nothing to say
        if item.body() == Some("") {
            continue;
        }

        // Events we don't render must not leave a stray rule behind
        let items = render_item(item);
        if items.is_empty() {
            continue;
        }

        if is_first_item {
            is_first_item = false;
        } else {
            lines.push(rule());
        }
        lines.extend(items);
    }
}

fn render_item(item: &Activity) -> Vec<String> {
    match item {
        Activity::Comment {
            created_at,
            author,
            body,
            reactions,
        } => {
            let mut items = vec![
                header(&format!("({}) {}:", format_timestamp(created_at), author), 4, None),
                paragraph(body),
            ];
            if let Some(summary) = reaction_summary(reactions) {
                items.push(paragraph(&summary));
            }
            items
        }
        Activity::Review {
            created_at,
            author,
            body,
        } => vec![
            header(&format!("({}) {}:", format_timestamp(created_at), author), 4, None),
            paragraph(body),
        ],
        Activity::Event { created_at, kind } => {
            let at = format_timestamp(created_at);
            let title = match kind {
                EventKind::Labeled { label } => format!("({}) Labeled \"{}\"", at, label),
                EventKind::Assigned { assignee } => format!("({}) Assigned to {}", at, assignee),
                EventKind::Referenced { actor, commit_id } => {
                    format!("({}) Referenced by {} in commit {}", at, actor, commit_id)
                }
                EventKind::Closed { actor } => format!("({}) Closed by {}", at, actor),
                EventKind::Reopened { actor } => format!("({}) Reopened by {}", at, actor),
                EventKind::Other => return Vec::new(),
            };
            vec![header(&title, 4, None)]
        }
    }
}

// "Reactions: +1 x2, heart x1", counted in first-seen order
fn reaction_summary(reactions: &[Reaction]) -> Option<String> {
    if reactions.is_empty() {
        return None;
    }

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for reaction in reactions {
        match counts.iter_mut().find(|(content, _)| *content == reaction.content) {
            Some((_, count)) => *count += 1,
            None => counts.push((reaction.content.as_str(), 1)),
        }
    }

    let parts: Vec<String> = counts
        .iter()
        .map(|(content, count)| format!("{} x{}", content, count))
        .collect();
    Some(format!("Reactions: {}", parts.join(", ")))
}
