// src/github/mod.rs
// =============================================================================
// This module handles everything that talks to the GitHub REST API.
//
// Submodules:
// - link: Parses the `Link` pagination header
// - fetch: Authenticated GET requests that follow pagination
// - aggregate: Downloads issues and attaches comments, events, reviews, ...
//
// Rust concepts:
// - Modules: Organizing related functionality
// - Public API: What other parts of the app can use
// =============================================================================

mod aggregate;
mod fetch;
mod link;

// Re-export the pieces the rest of the crate uses
pub use aggregate::get_issues;
pub use fetch::ApiClient;
