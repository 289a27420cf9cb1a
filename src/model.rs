// src/model.rs
// =============================================================================
// Typed views of the aggregated issue JSON.
//
// The aggregator keeps GitHub's raw payloads so issues.json loses nothing.
// Before rendering we decode each issue exactly once into these structs.
// Comments, reviews and timeline events are merged into one `Activity` list,
// sorted by creation time, so the renderer only has to match on a variant.
//
// Rust concepts:
// - serde::Deserialize: Reads the fields we need and ignores the rest
// - Enums with data: Each activity kind carries only its own fields
// =============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ExportError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub login: String,
}

// Only the reaction name is rendered; who reacted stays in the JSON dump
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reaction {
    /// Reaction name as GitHub spells it: `+1`, `heart`, `rocket`, ...
    pub content: String,
}

/// A review comment anchored to a line of a changed file.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewComment {
    pub path: String,
    /// `None` when the comment is on an outdated diff.
    pub line: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub user: User,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileContents {
    pub name: String,
    pub path: String,
    /// Base64 text, wrapped at 60 columns by GitHub.
    #[serde(default)]
    pub content: String,
}

impl FileContents {
    /// Decodes the base64 `content` into UTF-8 text.
    pub fn text(&self) -> Result<String> {
        // GitHub inserts newlines into the base64, the decoder refuses them
        let compact: String = self.content.chars().filter(|c| !c.is_whitespace()).collect();

        let bytes = STANDARD.decode(compact).map_err(|e| ExportError::Content {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        String::from_utf8(bytes).map_err(|e| ExportError::Content {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    pub contents: FileContents,
}

/// Pull-request-only data.
#[derive(Debug, Clone, Default)]
pub struct PullRequest {
    pub review_comments: Vec<ReviewComment>,
    pub files: Vec<ChangedFile>,
}

/// What happened in a timeline event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Labeled { label: String },
    Assigned { assignee: String },
    Referenced { actor: String, commit_id: String },
    Closed { actor: String },
    Reopened { actor: String },
    /// Any event we don't render (mentioned, subscribed, head_ref_deleted, ...).
    Other,
}

/// One entry of an issue's activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Comment {
        created_at: DateTime<Utc>,
        author: String,
        body: String,
        reactions: Vec<Reaction>,
    },
    Review {
        created_at: DateTime<Utc>,
        author: String,
        body: String,
    },
    Event {
        created_at: DateTime<Utc>,
        kind: EventKind,
    },
}

impl Activity {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Activity::Comment { created_at, .. }
            | Activity::Review { created_at, .. }
            | Activity::Event { created_at, .. } => *created_at,
        }
    }

    /// The text body, for the kinds that have one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Activity::Comment { body, .. } | Activity::Review { body, .. } => Some(body),
            Activity::Event { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub reactions: Vec<Reaction>,
    /// Comments, events and reviews, oldest first.
    pub activity: Vec<Activity>,
    pub pull_request: Option<PullRequest>,
}

impl Issue {
    /// Decodes one enriched issue from the aggregator.
    pub fn from_value(value: &Value) -> Result<Issue> {
        let raw = RawIssue::deserialize(value).map_err(|source| ExportError::Decode {
            context: describe(value),
            source,
        })?;
        let context = format!("issue #{}", raw.number);

        // Merge comments, then events, then reviews into one feed
        let mut activity = Vec::with_capacity(raw.comments.len() + raw.events.len() + raw.reviews.len());
        activity.extend(raw.comments.into_iter().map(|c| Activity::Comment {
            created_at: c.created_at,
            author: c.user.login,
            body: c.body.unwrap_or_default(),
            reactions: c.reactions_detailed,
        }));
        for event in raw.events {
            activity.push(event.into_activity(&context)?);
        }
        // Pending reviews have no submission time and never appear in the feed
        activity.extend(raw.reviews.into_iter().filter_map(|r| {
            Some(Activity::Review {
                created_at: r.created_at?,
                author: r.user.login,
                body: r.body.unwrap_or_default(),
            })
        }));
        // sort_by_key is stable: ties keep comment, event, review order
        activity.sort_by_key(Activity::created_at);

        // Pull-request data is only meaningful when GitHub flagged the issue as one
        let pull_request = raw.pull_request.map(|_| PullRequest {
            review_comments: raw.review_comments,
            files: raw.files,
        });

        Ok(Issue {
            number: raw.number,
            title: raw.title,
            body: raw.body,
            state: raw.state,
            user: raw.user,
            created_at: raw.created_at,
            closed_at: raw.closed_at,
            reactions: raw.reactions,
            activity,
            pull_request,
        })
    }
}

/// Decodes every issue in the aggregate.
pub fn decode_issues(values: &[Value]) -> Result<Vec<Issue>> {
    values.iter().map(Issue::from_value).collect()
}

/// Formats a timestamp the way GitHub prints it: `2020-01-01T00:00:00Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn describe(value: &Value) -> String {
    match value.get("number").and_then(Value::as_u64) {
        Some(number) => format!("issue #{}", number),
        None => "issue".to_string(),
    }
}

// Wire shapes -----------------------------------------------------------------

#[derive(Deserialize)]
struct RawIssue {
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    user: User,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pull_request: Option<IgnoredAny>,
    #[serde(default)]
    reactions: Vec<Reaction>,
    #[serde(default)]
    comments: Vec<RawComment>,
    #[serde(default)]
    events: Vec<RawEvent>,
    #[serde(default)]
    reviews: Vec<RawReview>,
    #[serde(default)]
    review_comments: Vec<ReviewComment>,
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Deserialize)]
struct RawComment {
    created_at: DateTime<Utc>,
    user: User,
    body: Option<String>,
    #[serde(default)]
    reactions_detailed: Vec<Reaction>,
}

#[derive(Deserialize)]
struct RawReview {
    // Copied from submitted_at by the aggregator
    created_at: Option<DateTime<Utc>>,
    user: User,
    body: Option<String>,
}

#[derive(Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Deserialize)]
struct RawEvent {
    event: String,
    created_at: DateTime<Utc>,
    actor: Option<User>,
    label: Option<RawLabel>,
    assignee: Option<User>,
    commit_id: Option<String>,
}

impl RawEvent {
    fn into_activity(self, context: &str) -> Result<Activity> {
        let missing = |field: &'static str| ExportError::MissingField {
            field,
            context: format!("{} event on {}", self.event, context),
        };

        let kind = match self.event.as_str() {
            "labeled" => EventKind::Labeled {
                label: self.label.as_ref().ok_or_else(|| missing("label"))?.name.clone(),
            },
            "assigned" => EventKind::Assigned {
                assignee: self.assignee.as_ref().ok_or_else(|| missing("assignee"))?.login.clone(),
            },
            "referenced" => EventKind::Referenced {
                actor: self.actor.as_ref().ok_or_else(|| missing("actor"))?.login.clone(),
                commit_id: self.commit_id.clone().ok_or_else(|| missing("commit_id"))?,
            },
            "closed" => EventKind::Closed {
                actor: self.actor.as_ref().ok_or_else(|| missing("actor"))?.login.clone(),
            },
            "reopened" => EventKind::Reopened {
                actor: self.actor.as_ref().ok_or_else(|| missing("actor"))?.login.clone(),
            },
            _ => EventKind::Other,
        };

        Ok(Activity::Event {
            created_at: self.created_at,
            kind,
        })
    }
}
