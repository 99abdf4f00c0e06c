//! Search collaborator: Google Custom Search JSON API.
//!
//! Returns the provider's raw response (the `items` envelope). Turning it
//! into records is the normalizer's job.

use crate::error::{Result, SerpxError};
use crate::locale::Locale;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const GOOGLE_CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Upper bound the CSE API accepts for `num`.
pub const MAX_RESULTS: u8 = 10;

pub const DEFAULT_RESULTS: u8 = 5;

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    num: u8,
    locale: Locale,
}

impl SearchRequest {
    pub fn new(query: &str, num: u8, locale: Locale) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SerpxError::InvalidParams(
                "Search query must not be empty".into(),
            ));
        }
        if !(1..=MAX_RESULTS).contains(&num) {
            return Err(SerpxError::InvalidParams(format!(
                "Result count must be between 1 and {}, got {}",
                MAX_RESULTS, num
            )));
        }
        Ok(Self {
            query: query.to_string(),
            num,
            locale,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn num(&self) -> u8 {
        self.num
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short provider name for logs and output.
    fn name(&self) -> &'static str;

    /// Run the search and return the provider's raw response.
    async fn search(&self, request: &SearchRequest) -> Result<Value>;
}

/// API key and search engine id for the CSE API.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCredentials {
    pub api_key: String,
    pub cx: String,
}

impl SearchCredentials {
    pub fn new(api_key: impl Into<String>, cx: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cx: cx.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.cx.trim().is_empty()
    }
}

impl std::fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"***")
            .field("cx", &self.cx)
            .finish()
    }
}

pub struct GoogleSearchConnector {
    client: Client,
    credentials: SearchCredentials,
    endpoint: String,
}

impl GoogleSearchConnector {
    pub fn new(credentials: SearchCredentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("serpx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SerpxError::HttpRequest)?;
        Ok(Self {
            client,
            credentials,
            endpoint: GOOGLE_CSE_ENDPOINT.to_string(),
        })
    }

    /// Point the connector at a different endpoint (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Request URL for `request`, including credentials.
    pub fn build_url(&self, request: &SearchRequest) -> Result<Url> {
        if !self.credentials.is_complete() {
            return Err(SerpxError::Authentication(
                "Missing credentials: set GOOGLE_API_KEY and GOOGLE_CX or run `serpx config set-key`"
                    .into(),
            ));
        }
        let num = request.num().to_string();
        let lr = request.locale().language_restrict();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.cx.as_str()),
                ("q", request.query()),
                ("num", num.as_str()),
                ("lr", lr.as_str()),
                ("gl", request.locale().country()),
            ],
        )
        .map_err(|e| SerpxError::Config(format!("Invalid search endpoint: {}", e)))
    }
}

/// `url` with the `key` parameter masked, for logs.
pub fn redacted_url(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}

#[async_trait]
impl SearchBackend for GoogleSearchConnector {
    fn name(&self) -> &'static str {
        "google-cse"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        let url = self.build_url(request)?;
        tracing::debug!(
            url = %redacted_url(&url),
            locale = %request.locale(),
            "calling Google Custom Search"
        );

        // reqwest errors carry the request URL, and with it the API key
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SerpxError::HttpRequest(e.without_url()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SerpxError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        let value: Value = resp
            .json()
            .await
            .map_err(|e| SerpxError::HttpRequest(e.without_url()))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector() -> GoogleSearchConnector {
        GoogleSearchConnector::new(SearchCredentials::new("test-api-key-123", "test-cx-id-456"))
            .unwrap()
    }

    #[test]
    fn request_validation() {
        assert!(SearchRequest::new("   ", 5, Locale::default()).is_err());
        assert!(SearchRequest::new("rust", 0, Locale::default()).is_err());
        assert!(SearchRequest::new("rust", 11, Locale::default()).is_err());
        let req = SearchRequest::new("  rust  ", 10, Locale::default()).unwrap();
        assert_eq!(req.query(), "rust");
    }

    #[test]
    fn url_carries_locale_derived_from_language() {
        let req = SearchRequest::new("python programming", 5, Locale::from_language("sk")).unwrap();
        let url = connector().build_url(&req).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["key"], "test-api-key-123");
        assert_eq!(params["cx"], "test-cx-id-456");
        assert_eq!(params["q"], "python programming");
        assert_eq!(params["num"], "5");
        assert_eq!(params["lr"], "lang_sk");
        assert_eq!(params["gl"], "SK");
        assert!(url.as_str().starts_with(GOOGLE_CSE_ENDPOINT));
    }

    #[test]
    fn url_uses_explicit_country() {
        let req = SearchRequest::new("q", 3, Locale::with_country("en", "gb")).unwrap();
        let url = connector().build_url(&req).unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "gl" && v == "GB"));
    }

    #[test]
    fn missing_credentials_is_an_auth_error() {
        let c = GoogleSearchConnector::new(SearchCredentials::default()).unwrap();
        let req = SearchRequest::new("q", 3, Locale::default()).unwrap();
        assert!(matches!(c.build_url(&req), Err(SerpxError::Authentication(_))));
    }

    #[test]
    fn redacted_url_masks_only_the_key() {
        let req = SearchRequest::new("q", 3, Locale::default()).unwrap();
        let url = connector().build_url(&req).unwrap();
        let redacted = redacted_url(&url);
        assert!(!redacted.as_str().contains("test-api-key-123"));
        let params: std::collections::HashMap<_, _> = redacted.query_pairs().into_owned().collect();
        assert_eq!(params["key"], "***");
        assert_eq!(params["cx"], "test-cx-id-456");
        assert_eq!(params["q"], "q");
    }

    #[tokio::test]
    async fn transport_errors_do_not_expose_the_api_key() {
        let connector =
            GoogleSearchConnector::new(SearchCredentials::new("SECRET-KEY-123", "cx"))
                .unwrap()
                .with_endpoint("http://127.0.0.1:1/customsearch/v1");
        let req = SearchRequest::new("q", 3, Locale::default()).unwrap();
        let err = connector.search(&req).await.unwrap_err();
        assert!(matches!(err, SerpxError::HttpRequest(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));
    }

    #[test]
    fn debug_output_masks_api_key() {
        let creds = SearchCredentials::new("secret", "cx");
        assert!(!format!("{:?}", creds).contains("secret"));
    }
}
