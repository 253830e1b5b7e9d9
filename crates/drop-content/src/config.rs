//! Content API client configuration.

use std::time::Duration;

use crate::error::{ContentError, ContentResult};

/// Default dataset name.
pub const DEFAULT_DATASET: &str = "production";

/// Default API version (date-based).
pub const DEFAULT_API_VERSION: &str = "2021-10-21";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`HttpContentBackend`](crate::client::HttpContentBackend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    /// Project identifier; forms the API host name.
    pub project_id: String,
    /// Dataset to query.
    pub dataset: String,
    /// API version, e.g. `2021-10-21`.
    pub api_version: String,
    /// Query the edge cache instead of the live API.
    pub use_cdn: bool,
    /// Read token for private datasets.
    pub token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Overrides the derived API base URL (local proxies, tests).
    pub base_url: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: DEFAULT_DATASET.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            use_cdn: true,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }
}

impl ContentConfig {
    /// Creates a configuration for a project with default settings.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_cdn(mut self, use_cdn: bool) -> Self {
        self.use_cdn = use_cdn;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Checks that required fields are present and well-formed.
    pub fn validate(&self) -> ContentResult<()> {
        if self.project_id.is_empty() {
            return Err(ContentError::InvalidConfig("project id is required".to_string()));
        }
        if !self
            .project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ContentError::InvalidConfig(format!(
                "project id contains invalid characters: {}",
                self.project_id
            )));
        }
        if self.dataset.is_empty() {
            return Err(ContentError::InvalidConfig("dataset is required".to_string()));
        }
        Ok(())
    }

    /// API base URL, e.g. `https://abc123.apicdn.sanity.io/v2021-10-21`.
    ///
    /// Authenticated requests always go to the live API; the edge cache
    /// does not serve tokens.
    pub fn api_base_url(&self) -> String {
        if let Some(base) = &self.base_url {
            return base.trim_end_matches('/').to_string();
        }
        let host = if self.use_cdn && self.token.is_none() {
            "apicdn"
        } else {
            "api"
        };
        format!(
            "https://{}.{}.sanity.io/v{}",
            self.project_id, host, self.api_version
        )
    }

    /// Full query endpoint for the configured dataset.
    pub fn query_url(&self) -> String {
        format!("{}/data/query/{}", self.api_base_url(), self.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ContentConfig::new("abc123");
        assert_eq!(config.dataset, "production");
        assert_eq!(config.api_version, "2021-10-21");
        assert!(config.use_cdn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_query_url_cdn() {
        let config = ContentConfig::new("abc123");
        assert_eq!(
            config.query_url(),
            "https://abc123.apicdn.sanity.io/v2021-10-21/data/query/production"
        );
    }

    #[test]
    fn test_query_url_live_api() {
        let config = ContentConfig::new("abc123")
            .with_cdn(false)
            .with_dataset("staging")
            .with_api_version("2023-05-03");
        assert_eq!(
            config.query_url(),
            "https://abc123.api.sanity.io/v2023-05-03/data/query/staging"
        );
    }

    #[test]
    fn test_token_bypasses_cdn() {
        let config = ContentConfig::new("abc123").with_token("sk-secret");
        assert!(config.api_base_url().starts_with("https://abc123.api.sanity.io"));
    }

    #[test]
    fn test_base_url_override() {
        let config = ContentConfig::new("abc123").with_base_url("http://127.0.0.1:8080/v1/");
        assert_eq!(config.query_url(), "http://127.0.0.1:8080/v1/data/query/production");
    }

    #[test]
    fn test_validate() {
        assert!(ContentConfig::default().validate().is_err());
        assert!(ContentConfig::new("abc/123").validate().is_err());
        assert!(ContentConfig::new("abc").with_dataset("").validate().is_err());
    }
}
