//! Content API client.
//!
//! [`ContentClient`] issues the two storefront queries through a
//! [`ContentBackend`]. The HTTP backend talks to the hosted query API; the
//! mock backend answers the same queries from memory for tests and local
//! development.
//!
//! # Example (Mock)
//!
//! ```
//! use drop_content::{ContentClient, MockContentBackend};
//!
//! # async fn example() -> drop_content::ContentResult<()> {
//! let client = ContentClient::new(MockContentBackend::new());
//! assert!(client.list_collections().await?.is_empty());
//! assert!(client.collection_by_slug("missing").await?.is_none());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::ContentConfig;
use crate::error::{ContentError, ContentResult};
use crate::query::{all_collections_query, collection_by_slug_query, QueryParams, SLUG_PARAM};
use crate::types::Collection;

/// Longest slug accepted before a query is issued.
pub const MAX_SLUG_LEN: usize = 96;

/// A source of query results.
///
/// Implementations return the `result` member of the query response: an
/// array for list queries, an object or `null` for `[0]` queries.
#[async_trait::async_trait]
pub trait ContentBackend: Send + Sync {
    /// Runs a GROQ query with parameters.
    async fn fetch(&self, query: &str, params: &QueryParams) -> ContentResult<Value>;
}

/// Backend for the hosted HTTP query API.
#[derive(Debug, Clone)]
pub struct HttpContentBackend {
    http: reqwest::Client,
    config: ContentConfig,
}

impl HttpContentBackend {
    /// Creates a backend; fails on invalid configuration.
    pub fn new(config: ContentConfig) -> ContentResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl ContentBackend for HttpContentBackend {
    async fn fetch(&self, query: &str, params: &QueryParams) -> ContentResult<Value> {
        let url = self.config.query_url();
        debug!(url = %url, params = params.to_query_pairs().len(), "content query");

        let mut request = self
            .http
            .get(&url)
            .query(&[("query", query)])
            .query(&params.to_query_pairs());
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text);
            warn!(status = status.as_u16(), message = %message, "content query rejected");
            return Err(ContentError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parse_query_response(&text)
    }
}

/// Extracts `result` from a query response body.
pub fn parse_query_response(body: &str) -> ContentResult<Value> {
    let mut value: Value = serde_json::from_str(body)?;
    value
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| ContentError::InvalidResponse("response has no `result` member".to_string()))
}

/// Best-effort error description from an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/description")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// In-memory backend answering the storefront queries.
#[derive(Debug, Default)]
pub struct MockContentBackend {
    collections: RwLock<Vec<Collection>>,
    failing: AtomicBool,
    queries: AtomicUsize,
}

impl MockContentBackend {
    /// Creates an empty mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock backend holding the given collections.
    pub fn with_collections(collections: Vec<Collection>) -> Self {
        Self {
            collections: RwLock::new(collections),
            ..Self::default()
        }
    }

    /// Adds a collection.
    pub async fn insert(&self, collection: Collection) {
        self.collections.write().await.push(collection);
    }

    /// Makes every following query fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of queries answered or rejected so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ContentBackend for MockContentBackend {
    async fn fetch(&self, _query: &str, params: &QueryParams) -> ContentResult<Value> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ContentError::Unavailable("mock backend failing".to_string()));
        }

        let collections = self.collections.read().await;
        match params.get(SLUG_PARAM).and_then(Value::as_str) {
            Some(slug) => match collections.iter().find(|c| c.slug.current == slug) {
                Some(collection) => Ok(serde_json::to_value(collection)?),
                None => Ok(Value::Null),
            },
            None => Ok(serde_json::to_value(&*collections)?),
        }
    }
}

/// Returns true if `slug` can name a collection.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Collection queries over a backend.
#[derive(Debug)]
pub struct ContentClient<B: ContentBackend> {
    backend: B,
}

impl<B: ContentBackend> ContentClient<B> {
    /// Creates a client over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetches all collections, in the order the API returns them.
    pub async fn list_collections(&self) -> ContentResult<Vec<Collection>> {
        let value = self
            .backend
            .fetch(&all_collections_query(), &QueryParams::new())
            .await?;
        let collections: Vec<Collection> = serde_json::from_value(value)?;
        debug!(count = collections.len(), "fetched collections");
        Ok(collections)
    }

    /// Fetches the collection with the given slug.
    ///
    /// Returns `Ok(None)` when nothing matches, including slugs that cannot
    /// exist (those never reach the backend).
    pub async fn collection_by_slug(&self, slug: &str) -> ContentResult<Option<Collection>> {
        if !is_valid_slug(slug) {
            debug!(slug = %slug, "rejected malformed slug");
            return Ok(None);
        }

        let params = QueryParams::new().with(SLUG_PARAM, slug);
        let value = self
            .backend
            .fetch(&collection_by_slug_query(), &params)
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Creator, Image, Slug};

    fn collection(slug: &str) -> Collection {
        Collection {
            id: format!("id-{}", slug),
            title: format!("Title {}", slug),
            description: "A drop".to_string(),
            nft_collection_name: slug.to_uppercase(),
            address: "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string(),
            slug: Slug::new(slug),
            creator: Some(Creator {
                id: "creator".to_string(),
                name: "Creator".to_string(),
                address: "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".to_string(),
                slug: Slug::new("creator"),
                bio: None,
                image: None,
            }),
            main_image: Image::from_ref("image-main-10x10-png"),
            preview_image: Image::from_ref("image-preview-10x10-png"),
        }
    }

    #[tokio::test]
    async fn test_list_collections_keeps_order() {
        let backend = MockContentBackend::with_collections(vec![
            collection("b"),
            collection("a"),
            collection("c"),
        ]);
        let client = ContentClient::new(backend);

        let slugs: Vec<String> = client
            .list_collections()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.slug.current)
            .collect();
        assert_eq!(slugs, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_collection_by_slug() {
        let client = ContentClient::new(MockContentBackend::with_collections(vec![
            collection("apes"),
            collection("punks"),
        ]));

        let found = client.collection_by_slug("punks").await.unwrap().unwrap();
        assert_eq!(found.id, "id-punks");
        assert_eq!(found.creator.map(|c| c.name).as_deref(), Some("Creator"));
    }

    #[tokio::test]
    async fn test_collection_by_slug_not_found() {
        let client = ContentClient::new(MockContentBackend::with_collections(vec![collection(
            "apes",
        )]));

        assert!(client.collection_by_slug("nope").await.unwrap().is_none());
        assert_eq!(client.backend().query_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_slug_skips_query() {
        let client = ContentClient::new(MockContentBackend::new());

        assert!(client.collection_by_slug("").await.unwrap().is_none());
        assert!(client.collection_by_slug("a/b").await.unwrap().is_none());
        assert!(client.collection_by_slug("a\"] || true").await.unwrap().is_none());
        assert_eq!(client.backend().query_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = MockContentBackend::new();
        backend.set_failing(true);
        let client = ContentClient::new(backend);

        assert!(matches!(
            client.list_collections().await,
            Err(ContentError::Unavailable(_))
        ));
        assert!(client.collection_by_slug("apes").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_insert() {
        let backend = MockContentBackend::new();
        backend.insert(collection("late")).await;
        let client = ContentClient::new(backend);
        assert_eq!(client.list_collections().await.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_query_response() {
        let body = r#"{"ms": 4, "query": "*[0]", "result": [{"a": 1}]}"#;
        let value = parse_query_response(body).unwrap();
        assert_eq!(value, serde_json::json!([{"a": 1}]));

        let value = parse_query_response(r#"{"ms": 1, "result": null}"#).unwrap();
        assert!(value.is_null());

        assert!(matches!(
            parse_query_response(r#"{"ms": 1}"#),
            Err(ContentError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_query_response("<html>"),
            Err(ContentError::Decode(_))
        ));
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error": {"description": "Unable to parse query", "type": "queryParseError"}}"#;
        assert_eq!(error_message(body), "Unable to parse query");
        assert_eq!(error_message(r#"{"message": "nope"}"#), "nope");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("ape-yacht_club2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(&"a".repeat(MAX_SLUG_LEN + 1)));
    }

    #[test]
    fn test_http_backend_rejects_invalid_config() {
        assert!(HttpContentBackend::new(ContentConfig::default()).is_err());
        let backend = HttpContentBackend::new(ContentConfig::new("abc123")).unwrap();
        assert_eq!(backend.config().project_id, "abc123");
    }
}
