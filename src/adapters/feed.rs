use crate::domain::model::Article;
use crate::domain::ports::FeedSource;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("news-relay/", env!("CARGO_PKG_VERSION"));

/// Fetches RSS, Atom and JSON feeds over HTTP.
pub struct RssFeedSource {
    client: Client,
}

impl RssFeedSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Parses a feed document. Entries without any usable identifier are dropped.
    pub fn parse(url: &str, content: &[u8]) -> Result<Vec<Article>> {
        let feed = feed_rs::parser::parse(content).map_err(|e| RelayError::FeedError {
            url: url.to_string(),
            message: format!("Failed to parse feed: {}", e),
        })?;

        Ok(feed.entries.into_iter().filter_map(entry_to_article).collect())
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<Article>> {
        tracing::info!("Fetching RSS feed: {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(RelayError::FeedError {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let content = response.bytes().await?;
        let articles = Self::parse(url, &content)?;
        tracing::info!("Found {} articles in feed", articles.len());
        Ok(articles)
    }
}

fn entry_to_article(entry: feed_rs::model::Entry) -> Option<Article> {
    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty());
    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default();

    // guid → link → title
    let id = [entry.id.trim(), link.as_str(), title.as_deref().unwrap_or("")]
        .into_iter()
        .find(|candidate| !candidate.is_empty())?
        .to_string();

    let body = entry
        .summary
        .map(|s| s.content)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    Some(Article {
        id,
        title: title.unwrap_or_else(|| "No title".to_string()),
        body,
        link,
        published: entry.published.or(entry.updated),
    })
}
