//! services/api/src/adapters/news.rs
//!
//! This module contains the adapter for the external news provider.
//! It implements the `NewsProvider` port from the `core` crate.
//!
//! Responses are cached best-effort for a few minutes keyed by
//! `{language, query, page_size}`; a cache miss or unavailable cache falls
//! through to a live fetch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use news_core::domain::Article;
use news_core::ports::{Cache, NewsProvider, PortError, PortResult};
use serde::Deserialize;
use tracing::{debug, warn};

const BASE_URL: &str = "https://newsapi.org/v2/everything";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `NewsProvider` against the NewsAPI HTTP API.
#[derive(Clone)]
pub struct NewsApiAdapter {
    http: reqwest::Client,
    api_key: String,
    cache: Arc<dyn Cache>,
}

impl NewsApiAdapter {
    /// Creates a new `NewsApiAdapter` with a bounded request timeout.
    pub fn new(api_key: String, cache: Arc<dyn Cache>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, api_key, cache })
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    articles: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct SourceRecord {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleRecord {
    source: SourceRecord,
    author: Option<String>,
    title: String,
    description: Option<String>,
    url: String,
    url_to_image: Option<String>,
    published_at: DateTime<Utc>,
    content: Option<String>,
}

impl ArticleRecord {
    fn to_domain(self) -> Article {
        Article {
            source: self.source.name,
            author: self.author,
            title: self.title,
            description: self.description,
            url: self.url,
            image_url: self.url_to_image,
            published_at: self.published_at,
            content: self.content,
        }
    }
}

/// Parses a raw provider response body. A single malformed article is
/// skipped rather than aborting the batch; only an unreadable envelope is
/// an error.
fn parse_articles(body: &str) -> PortResult<Vec<Article>> {
    let response: ProviderResponse = serde_json::from_str(body)
        .map_err(|e| PortError::Upstream(format!("unreadable news payload: {}", e)))?;

    let mut articles = Vec::with_capacity(response.articles.len());
    for raw in response.articles {
        match serde_json::from_value::<ArticleRecord>(raw) {
            Ok(record) => articles.push(record.to_domain()),
            Err(e) => debug!("skipping malformed article from provider: {}", e),
        }
    }
    Ok(articles)
}

//=========================================================================================
// `NewsProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl NewsProvider for NewsApiAdapter {
    async fn fetch(
        &self,
        topics: &[String],
        language: &str,
        page_size: u32,
    ) -> PortResult<Vec<Article>> {
        let query = topics.join(" OR ");
        let cache_key = format!("news:{}:{}:{}", language, query, page_size);

        if let Some(cached) = self.cache.get(&cache_key).await {
            return parse_articles(&cached);
        }

        let response = self
            .http
            .get(BASE_URL)
            .query(&[
                ("q", query.as_str()),
                ("language", language),
                ("pageSize", &page_size.to_string()),
                ("sortBy", "publishedAt"),
                ("apiKey", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| PortError::Upstream(format!("news provider request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!("news provider returned status {}", response.status());
            return Err(PortError::Upstream(format!(
                "news provider returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PortError::Upstream(format!("news provider body unreadable: {}", e)))?;

        self.cache.put(&cache_key, &body, CACHE_TTL).await;
        parse_articles(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_ARTICLE: &str = r#"{
        "source": {"id": null, "name": "Slickdeals.net"},
        "author": "someone",
        "title": "Redragon K556 mechanical keyboard deal",
        "description": "A deal",
        "url": "https://example.com/deal",
        "urlToImage": "https://example.com/deal.jpg",
        "publishedAt": "2025-07-21T14:45:56Z",
        "content": "Full text"
    }"#;

    #[test]
    fn zero_provider_results_parse_to_an_empty_list() {
        let articles = parse_articles(r#"{"status":"ok","totalResults":0,"articles":[]}"#).unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn provider_fields_map_onto_the_normalized_shape() {
        let body = format!(r#"{{"articles":[{}]}}"#, GOOD_ARTICLE);
        let articles = parse_articles(&body).unwrap();
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.source, "Slickdeals.net");
        assert_eq!(a.image_url.as_deref(), Some("https://example.com/deal.jpg"));
        assert_eq!(a.url, "https://example.com/deal");
    }

    #[test]
    fn one_malformed_article_does_not_abort_the_batch() {
        // Second entry is missing its url and publishedAt.
        let body = format!(
            r#"{{"articles":[{}, {{"source":{{"name":"X"}},"title":"broken"}}]}}"#,
            GOOD_ARTICLE
        );
        let articles = parse_articles(&body).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Redragon K556 mechanical keyboard deal");
    }

    #[test]
    fn unreadable_envelope_is_an_upstream_error() {
        assert!(matches!(
            parse_articles("<html>gateway error</html>"),
            Err(PortError::Upstream(_))
        ));
    }
}
