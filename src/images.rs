// src/images.rs
// =============================================================================
// This module downloads images attached to issues and comments.
//
// GitHub stores pasted images on two CDN hosts:
//   - https://user-images.githubusercontent.com/...
//   - https://cloud.githubusercontent.com/...
//
// Instead of walking every body field, we serialize the whole aggregate to
// JSON text and search it with a regex. Each unique image is saved as
// <base64 of its path>.<extension>, so the original URL can always be
// recovered from the file name.
//
// Quotes inside JSON strings are escaped, so an HTML tag like
// <img src="https://...png"> shows up as src=\"https://...png\". The pattern
// stops the path before that backslash.
//
// Rust concepts:
// - Streams: The response body arrives in chunks we write as they come
// - HashSet: Skips images we've already seen
// =============================================================================

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use futures::StreamExt;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::error::{ExportError, Result};

fn image_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // A constant pattern that is known to compile
        Regex::new(r#"[("]https://(cloud|user-images)\.githubusercontent\.com/([^"\\)]*?)\\?[)"]"#)
            .expect("image pattern is valid")
    })
}

// An image URL found in the exported data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbeddedImage {
    /// "cloud" or "user-images"
    pub subdomain: String,
    /// Everything after the host, e.g. "123/abc.png"
    pub path: String,
}

impl EmbeddedImage {
    pub fn url(&self) -> String {
        format!("https://{}.githubusercontent.com/{}", self.subdomain, self.path)
    }

    /// Where to download the image from. With a mirror, the subdomain becomes
    /// the first path segment: `<mirror>/user-images/123/abc.png`.
    pub fn download_url(&self, mirror: Option<&Url>) -> String {
        match mirror {
            Some(base) => format!(
                "{}/{}/{}",
                base.as_str().trim_end_matches('/'),
                self.subdomain,
                self.path
            ),
            None => self.url(),
        }
    }

    /// File name for the downloaded image: URL-safe base64 of the path plus
    /// the original extension.
    pub fn file_name(&self) -> String {
        let encoded = URL_SAFE.encode(self.path.as_bytes());
        let last_segment = self.path.rsplit('/').next().unwrap_or(&self.path);

        match last_segment.rsplit_once('.') {
            Some((_, extension)) => format!("{}.{}", encoded, extension),
            None => encoded,
        }
    }
}

/// Finds every unique CDN image URL in `text`, in order of first appearance.
pub fn find_embedded_images(text: &str) -> Vec<EmbeddedImage> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for caps in image_pattern().captures_iter(text) {
        let image = EmbeddedImage {
            subdomain: caps[1].to_string(),
            path: caps[2].to_string(),
        };
        if seen.insert(image.clone()) {
            images.push(image);
        }
    }

    images
}

/// Downloads every image referenced anywhere in `data` into `folder`.
///
/// `mirror` replaces the CDN hosts when set. Stops at the first failed
/// download. Returns how many images were saved.
pub async fn download_embedded_images(
    client: &Client,
    data: &[Value],
    folder: &Path,
    mirror: Option<&Url>,
) -> Result<usize> {
    // Same text the JSON dump is made of, minus the indentation
    let text = serde_json::to_string(data).map_err(|source| ExportError::Decode {
        context: "aggregated issues".to_string(),
        source,
    })?;

    let images = find_embedded_images(&text);
    info!(count = images.len(), "found embedded images");

    // One request per unique image, in the order they first appear
    for image in &images {
        let dest = folder.join(image.file_name());
        download_image(client, &image.download_url(mirror), &dest).await?;
    }

    Ok(images.len())
}

// Streams one URL into `dest`
pub async fn download_image(client: &Client, url: &str, dest: &Path) -> Result<()> {
    debug!(%url, dest = %dest.display(), "downloading image");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ExportError::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExportError::remote(url, status));
    }

    let mut file = File::create(dest).await.map_err(|e| ExportError::io(dest, e))?;
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| ExportError::transport(url, e))?;
        file.write_all(&chunk).await.map_err(|e| ExportError::io(dest, e))?;
    }

    // tokio files buffer writes; flush before the handle is dropped
    file.flush().await.map_err(|e| ExportError::io(dest, e))?;
    Ok(())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is OnceLock?
//    - A cell that is written once and then only read
//    - We compile the regex the first time it's needed and reuse it
//
// 2. Why URL_SAFE instead of STANDARD base64?
//    - Standard base64 uses '/' and '+'
//    - A '/' inside a file name would be read as a directory separator
//    - URL_SAFE uses '-' and '_' instead, and is still reversible
//
// 3. What does HashSet::insert return?
//    - true if the value was new, false if it was already there
//    - That makes "keep only the first occurrence" a one-liner
// -----------------------------------------------------------------------------
