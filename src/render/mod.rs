// src/render/mod.rs
// =============================================================================
// This module turns decoded issues into a Markdown document that looks
// roughly like GitHub's issue page.
//
// Submodules:
// - markdown: Header, paragraph, rule and blockquote snippets
// - files: Pull request .md files with review comments interleaved
// - document: The whole document (title, contents, issues, activity feed)
// =============================================================================

mod document;
mod files;
mod markdown;

pub use document::build_markdown;
