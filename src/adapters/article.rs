use crate::domain::ports::ArticleExtractor;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

const USER_AGENT: &str = concat!("news-relay/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_CONTENT_SELECTORS: [&str; 4] =
    [".post-content", ".entry-content", ".single-content", "article"];

/// Reads the paragraphs of an article page from the first content
/// container that has any.
#[derive(Debug)]
pub struct HtmlArticleExtractor {
    client: Client,
    selectors: Vec<String>,
}

impl HtmlArticleExtractor {
    pub fn new(selectors: Vec<String>, timeout: Duration) -> Result<Self> {
        for selector in &selectors {
            parse_selector(selector)?;
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, selectors })
    }

    /// Paragraph text of the first matching container, one paragraph per line.
    pub fn article_text(html: &str, selectors: &[String]) -> Result<Option<String>> {
        let document = Html::parse_document(html);
        let paragraph = parse_selector("p")?;

        for selector in selectors {
            let container = parse_selector(selector)?;
            let Some(element) = document.select(&container).next() else {
                continue;
            };

            let paragraphs: Vec<String> = element
                .select(&paragraph)
                .map(|p| p.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty())
                .collect();
            if !paragraphs.is_empty() {
                return Ok(Some(paragraphs.join("\n")));
            }
        }

        Ok(None)
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| RelayError::InvalidConfigValueError {
        field: "article.selectors".to_string(),
        value: selector.to_string(),
        reason: format!("Invalid CSS selector: {}", e),
    })
}

#[async_trait]
impl ArticleExtractor for HtmlArticleExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        tracing::debug!("Fetching article page: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::FeedError {
                url: url.to_string(),
                message: format!("article page returned HTTP {}", status),
            });
        }

        let html = response.text().await?;
        Self::article_text(&html, &self.selectors)
    }
}
