// src/github/fetch.rs
// =============================================================================
// This module talks to the GitHub REST API.
//
// Strategy:
// - Every request carries the token as a bearer credential
// - Every request asks for the "squirrel-girl" preview media type, which
//   makes GitHub include reaction summaries on issues and comments
// - If a response has a `Link` header with rel="next", keep following it
//   and glue the pages together in order
//
// Requests are awaited one by one. A repository with 500 issues makes a lot
// of requests, but they never overlap.
//
// Rust concepts:
// - async functions: For network I/O
// - Result: Any non-2xx response becomes an ExportError::RemoteRequest
// - serde_json::Value: An untyped JSON tree we can extend and re-serialize
// =============================================================================

use reqwest::header::{ACCEPT, LINK};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};

use super::link;
use crate::config::ExportConfig;
use crate::error::{ExportError, Result};

/// Media type that enables reaction data in API responses.
pub const ACCEPT_HEADER: &str = "application/vnd.github.squirrel-girl-preview+json";

/// GitHub rejects requests without a User-Agent.
pub const USER_AGENT: &str = concat!("issue-export/", env!("CARGO_PKG_VERSION"));

// An authenticated GitHub API client
//
// Cloning is cheap: reqwest::Client is a reference-counted handle
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    token: String,
}

impl ApiClient {
    // Creates a client for the token in `config`
    pub fn new(config: &ExportConfig) -> Result<Self> {
        // Only fails if the TLS backend can't be initialized
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ExportError::transport(config.api_url.as_str(), e))?;

        Ok(ApiClient {
            client,
            token: config.token.clone(),
        })
    }

    /// The underlying HTTP client, for requests that need no API credentials.
    pub fn http(&self) -> &Client {
        &self.client
    }

    // Fetches a single page and returns its JSON plus the next page URL
    async fn get_page(&self, url: &str) -> Result<(Value, Option<String>)> {
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HEADER)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ExportError::transport(url, e))?;

        // Any non-2xx status aborts the export
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::remote(url, status));
        }

        // Read the Link header before .json() consumes the response
        let next = match response.headers().get(LINK).and_then(|v| v.to_str().ok()) {
            Some(header) => {
                trace!(pages = ?link::parse_link_header(header), "pagination links");
                link::next_page_url(header)
            }
            None => None,
        };

        let data = response
            .json::<Value>()
            .await
            .map_err(|e| ExportError::transport(url, e))?;

        Ok((data, next))
    }

    /// Downloads JSON from an API URL, following pagination.
    ///
    /// Array pages are concatenated in page order. An object response (a
    /// single issue, a file's contents) is returned as it came.
    pub async fn load_all(&self, url: &str) -> Result<Value> {
        let (mut data, mut next) = self.get_page(url).await?;

        // Only lists can be extended with later pages
        if let Value::Array(items) = &mut data {
            // Nothing bounds the number of pages: a server that always sends
            // rel="next" keeps us here forever
            while let Some(next_url) = next {
                let (page, following) = self.get_page(&next_url).await?;
                match page {
                    Value::Array(more) => items.extend(more),
                    other => items.push(other),
                }
                next = following;
            }
        }

        Ok(data)
    }

    /// Like `load_all`, but the endpoint must return a list.
    pub async fn load_list(&self, url: &str) -> Result<Vec<Value>> {
        let data = self.load_all(url).await?;
        // An object here means the endpoint isn't the one we expected
        serde_json::from_value(data).map_err(|source| ExportError::Decode {
            context: format!("list response from {}", url),
            source,
        })
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `if let Value::Array(items) = &mut data`?
//    - It checks whether the JSON is a list and, if so, borrows it mutably
//    - `items` is then a &mut Vec<Value> we can push pages into
//    - Objects skip the block and are returned untouched
//
// 2. Why a loop instead of recursion?
//    - Recursive async functions need boxing in Rust
//    - A while let loop does the same thing: fetch, append, follow "next"
//    - Both make exactly one request per page
//
// 3. What does .bearer_auth() do?
//    - Adds the header `Authorization: Bearer <token>`
//    - reqwest marks it as sensitive so it is not printed in debug output
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoId;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let repo: RepoId = "acme/widgets".parse().unwrap();
        let config = ExportConfig::new("secret-token", repo, None)
            .with_api_url(Url::parse(&server.uri()).unwrap());
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_load_all_follows_next_links_in_order() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([1, 2]))
                    .insert_header(
                        "Link",
                        format!(r#"<{uri}/items/p2>; rel="next", <{uri}/items/p3>; rel="last""#).as_str(),
                    ),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items/p2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([3]))
                    .insert_header("Link", format!(r#"<{uri}/items/p3>; rel="next""#).as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items/p3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([4, 5]))
                    .insert_header("Link", format!(r#"<{uri}/items>; rel="first""#).as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let data = client.load_list(&format!("{uri}/items")).await.unwrap();

        assert_eq!(data, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_sends_token_and_preview_accept_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/issue"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("accept", ACCEPT_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"number": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let data = client.load_all(&format!("{}/issue", server.uri())).await.unwrap();
        assert_eq!(data, json!({"number": 1}));
    }

    #[tokio::test]
    async fn test_error_status_becomes_remote_request_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = format!("{}/missing", server.uri());
        let err = client.load_all(&url).await.unwrap_err();

        match err {
            ExportError::RemoteRequest {
                url: failed,
                status,
                reason,
            } => {
                assert_eq!(failed, url);
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("expected RemoteRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_list_rejects_object() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/object"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a": 1})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .load_list(&format!("{}/object", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Decode { .. }));
    }
}
