//! services/api/src/web/feed.rs
//!
//! The dashboard feed orchestrator: preferences -> fetch -> filter -> cap ->
//! summarize. Summarization for a batch runs concurrently but results are
//! zipped back by index, so the provider's ordering (typically recency) is
//! preserved in the response.

use futures::future::join_all;
use news_core::domain::{Article, SummarizedArticle, User};
use news_core::filter::{is_english, is_relevant};
use news_core::ports::{NewsProvider, PortError, Summarizer};
use tracing::warn;

/// Shown inline when a single article's summarization fails; the article
/// itself is never dropped for it.
pub const SUMMARY_FALLBACK: &str =
    "Summary unavailable - visit the article for full details.";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The user has no topics yet; the client should send them to the
    /// preference setup flow.
    #[error("no topics selected")]
    NeedsPreferences,
    #[error(transparent)]
    Port(#[from] PortError),
}

/// The composed personalized feed.
#[derive(Debug)]
pub struct Feed {
    pub articles: Vec<SummarizedArticle>,
    pub favorites_count: usize,
}

fn keep(article: &Article, topics: &[String]) -> bool {
    let gist = format!(
        "{} {}",
        article.title,
        article.description.as_deref().unwrap_or("")
    );
    is_english(&gist) && is_relevant(article, topics)
}

/// Builds the personalized feed for `user`.
///
/// A news-provider failure fails the whole feed (no partial dashboard);
/// per-article summarization failures degrade to [`SUMMARY_FALLBACK`].
pub async fn build_feed(
    news: &dyn NewsProvider,
    summarizer: &dyn Summarizer,
    user: &User,
) -> Result<Feed, FeedError> {
    let prefs = &user.preferences;
    if prefs.topics.is_empty() {
        return Err(FeedError::NeedsPreferences);
    }

    let fetched = news
        .fetch(&prefs.topics, &prefs.language, prefs.article_count)
        .await?;

    let selected: Vec<Article> = fetched
        .into_iter()
        .filter(|a| keep(a, &prefs.topics))
        .take(prefs.article_count as usize)
        .collect();

    // Concurrent fan-out; join_all keeps results in input order.
    let summaries = join_all(selected.iter().map(|article| async {
        let body = article
            .content
            .as_deref()
            .or(article.description.as_deref())
            .unwrap_or("");
        summarizer
            .summarize(&article.title, body, &prefs.language)
            .await
            .unwrap_or_else(|e| {
                warn!("summarization failed for {}: {}", article.url, e);
                SUMMARY_FALLBACK.to_string()
            })
    }))
    .await;

    let articles = selected
        .into_iter()
        .zip(summaries)
        .map(|(article, summary)| SummarizedArticle { article, summary })
        .collect();

    Ok(Feed {
        articles,
        favorites_count: user.favorites.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use news_core::domain::{Favorite, Preferences};
    use news_core::ports::PortResult;
    use std::time::Duration;
    use uuid::Uuid;

    fn user_with(topics: &[&str], article_count: u32) -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@x.com".to_string(),
            display_name: "Jane".to_string(),
            preferences: Preferences {
                topics: topics.iter().map(|t| t.to_string()).collect(),
                article_count,
                language: "en".to_string(),
            },
            favorites: vec![Favorite {
                url: "https://example.com/saved".to_string(),
                title: "Saved".to_string(),
                source: "Wire".to_string(),
                published: "2025-07-21T14:45:56Z".to_string(),
            }],
            created_at: Utc::now(),
        }
    }

    fn article(title: &str) -> Article {
        Article {
            source: "Wire".to_string(),
            author: None,
            title: title.to_string(),
            description: Some("daily report".to_string()),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            image_url: None,
            published_at: Utc::now(),
            content: Some("A long enough body of article text to summarize.".to_string()),
        }
    }

    struct FixedNews(Vec<Article>);

    #[async_trait]
    impl NewsProvider for FixedNews {
        async fn fetch(&self, _: &[String], _: &str, _: u32) -> PortResult<Vec<Article>> {
            Ok(self.0.clone())
        }
    }

    struct FailingNews;

    #[async_trait]
    impl NewsProvider for FailingNews {
        async fn fetch(&self, _: &[String], _: &str, _: u32) -> PortResult<Vec<Article>> {
            Err(PortError::Upstream("news provider returned 500".to_string()))
        }
    }

    /// Echoes the title back, sleeping longer for earlier articles so
    /// completion order is the reverse of input order.
    struct SkewedSummarizer;

    #[async_trait]
    impl Summarizer for SkewedSummarizer {
        async fn summarize(&self, title: &str, _: &str, _: &str) -> PortResult<String> {
            let delay = if title.contains("first") { 50 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(format!("summary of {}", title))
        }
    }

    /// Fails for one specific article, succeeds for the rest.
    struct FlakySummarizer;

    #[async_trait]
    impl Summarizer for FlakySummarizer {
        async fn summarize(&self, title: &str, _: &str, _: &str) -> PortResult<String> {
            if title.contains("broken") {
                Err(PortError::Upstream("timeout".to_string()))
            } else {
                Ok(format!("summary of {}", title))
            }
        }
    }

    #[tokio::test]
    async fn empty_topics_redirect_to_preference_setup() {
        let user = user_with(&[], 10);
        let result = build_feed(&FixedNews(vec![]), &SkewedSummarizer, &user).await;
        assert!(matches!(result, Err(FeedError::NeedsPreferences)));
    }

    #[tokio::test]
    async fn provider_failure_fails_the_whole_feed() {
        let user = user_with(&["report"], 10);
        let result = build_feed(&FailingNews, &SkewedSummarizer, &user).await;
        assert!(matches!(result, Err(FeedError::Port(PortError::Upstream(_)))));
    }

    #[tokio::test]
    async fn ordering_is_preserved_despite_out_of_order_completion() {
        let user = user_with(&["report"], 10);
        let news = FixedNews(vec![article("first report"), article("second report")]);
        let feed = build_feed(&news, &SkewedSummarizer, &user).await.unwrap();
        assert_eq!(feed.articles.len(), 2);
        assert_eq!(feed.articles[0].summary, "summary of first report");
        assert_eq!(feed.articles[1].summary, "summary of second report");
    }

    #[tokio::test]
    async fn summarizer_failure_degrades_to_the_fallback_string() {
        let user = user_with(&["report"], 10);
        let news = FixedNews(vec![article("broken report"), article("fine report")]);
        let feed = build_feed(&news, &FlakySummarizer, &user).await.unwrap();
        assert_eq!(feed.articles[0].summary, SUMMARY_FALLBACK);
        assert_eq!(feed.articles[1].summary, "summary of fine report");
    }

    #[tokio::test]
    async fn feed_is_capped_and_filtered() {
        let user = user_with(&["report"], 2);
        let mut irrelevant = article("cooking tips");
        irrelevant.description = Some("nothing matching here".to_string());
        let mut non_english = article("weather report");
        non_english.title = "דוח מזג אוויר".to_string();
        let news = FixedNews(vec![
            article("report one"),
            irrelevant,
            non_english,
            article("report two"),
            article("report three"),
        ]);
        let feed = build_feed(&news, &SkewedSummarizer, &user).await.unwrap();
        assert_eq!(feed.articles.len(), 2);
        assert_eq!(feed.articles[0].article.title, "report one");
        assert_eq!(feed.articles[1].article.title, "report two");
        assert_eq!(feed.favorites_count, 1);
    }
}
