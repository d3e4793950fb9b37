use crate::core::formatter::PostTemplate;
use crate::core::ledger::Ledger;
use crate::domain::model::{Article, Post, RunReport, Summary};
use crate::domain::ports::{ArticleExtractor, FeedSource, Publisher, Storage, Summarizer, Translator};
use crate::utils::error::Result;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub max_fragments: usize,
    pub target_language: String,
    pub publish_delay: Duration,
    pub max_posts: Option<usize>,
    pub template: PostTemplate,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_fragments: 3,
            target_language: "bn".to_string(),
            publish_delay: Duration::from_secs(2),
            max_posts: None,
            template: PostTemplate::default(),
        }
    }
}

/// Drives one scheduled run: fetch, dedupe against the ledger, summarize,
/// translate, publish, record. Articles are handled strictly one at a time.
pub struct NewsPipeline<S: Storage> {
    feeds: Vec<String>,
    source: Box<dyn FeedSource>,
    summarizer: Box<dyn Summarizer>,
    translator: Box<dyn Translator>,
    publisher: Box<dyn Publisher>,
    extractor: Option<Box<dyn ArticleExtractor>>,
    ledger: Ledger<S>,
    settings: RunSettings,
}

impl<S: Storage> NewsPipeline<S> {
    pub fn new(
        feeds: Vec<String>,
        source: Box<dyn FeedSource>,
        summarizer: Box<dyn Summarizer>,
        translator: Box<dyn Translator>,
        publisher: Box<dyn Publisher>,
        ledger: Ledger<S>,
        settings: RunSettings,
    ) -> Self {
        Self {
            feeds,
            source,
            summarizer,
            translator,
            publisher,
            extractor: None,
            ledger,
            settings,
        }
    }

    /// Summarize the full article page instead of the feed description.
    pub fn with_extractor(mut self, extractor: Box<dyn ArticleExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub async fn run(&mut self) -> Result<RunReport> {
        let mut report = RunReport::start(self.feeds.len());
        tracing::info!(
            "Starting run: {} feeds, {} ledger entries, summarizer={}",
            self.feeds.len(),
            self.ledger.len(),
            self.summarizer.name()
        );

        let candidates = self.collect_candidates(&mut report).await;
        tracing::info!(
            "Fetched {} articles, {} already posted, {} to process",
            report.fetched,
            report.skipped,
            candidates.len()
        );

        let mut publish_attempted = false;
        for article in candidates {
            if let Some(limit) = self.settings.max_posts {
                if report.published >= limit {
                    tracing::info!("Reached max_posts limit ({}), stopping", limit);
                    break;
                }
            }

            let message = self.prepare_message(&article).await;

            if publish_attempted && !self.settings.publish_delay.is_zero() {
                tokio::time::sleep(self.settings.publish_delay).await;
            }
            publish_attempted = true;

            tracing::info!(article_id = %article.id, "Posting article: {}", article.short_title());
            match self.publisher.publish(&message).await {
                Ok(receipt) => {
                    // 發布成功後立即寫入帳本，再處理下一篇
                    self.ledger.record(&article.id).await?;
                    report.published += 1;
                    tracing::info!(
                        article_id = %article.id,
                        post_id = %receipt.post_id,
                        "✓ Successfully posted: {}",
                        article.short_title()
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        article_id = %article.id,
                        stage = "publish",
                        "✗ Failed to post '{}', will retry next run: {}",
                        article.short_title(),
                        e
                    );
                }
            }
        }

        let report = report.finish();
        tracing::info!(
            "Run finished: published={}, failed={}, skipped={}, feeds_failed={}",
            report.published,
            report.failed,
            report.skipped,
            report.feeds_failed
        );
        Ok(report)
    }

    /// Fetches every feed in order and keeps articles not yet in the ledger.
    /// A failing feed is logged and skipped.
    pub async fn collect_candidates(&self, report: &mut RunReport) -> Vec<Article> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for url in &self.feeds {
            let articles = match self.source.fetch(url).await {
                Ok(articles) => articles,
                Err(e) => {
                    report.feeds_failed += 1;
                    tracing::warn!(feed = %url, stage = "fetch", "Skipping feed: {}", e);
                    continue;
                }
            };
            tracing::debug!("Found {} articles in {}", articles.len(), url);

            for article in articles {
                report.fetched += 1;
                if self.ledger.contains(&article.id) {
                    report.skipped += 1;
                    tracing::debug!(article_id = %article.id, "Skipping already posted article");
                    continue;
                }
                if seen.insert(article.id.clone()) {
                    candidates.push(article);
                }
            }
        }

        candidates
    }

    /// Summarizes, translates and renders an article. Never fails: each stage
    /// degrades to the untransformed text.
    pub async fn prepare_message(&self, article: &Article) -> String {
        let body = self.article_text(article).await;
        let summary = match self
            .summarizer
            .summarize(&body, self.settings.max_fragments)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(
                    article_id = %article.id,
                    stage = "summarize",
                    "Summarization failed, posting without summary: {}",
                    e
                );
                Summary::default()
            }
        };

        let title = self
            .translate_or_original(&article.title, &article.id, "translate-title")
            .await;

        let mut fragments = Vec::with_capacity(summary.len());
        for fragment in &summary.fragments {
            fragments.push(
                self.translate_or_original(fragment, &article.id, "translate-summary")
                    .await,
            );
        }

        let post = Post {
            title,
            fragments,
            link: article.link.clone(),
        };
        self.settings.template.render(&post)
    }

    /// Full page text when an extractor is configured and finds a body,
    /// otherwise the feed description.
    async fn article_text(&self, article: &Article) -> String {
        let Some(extractor) = &self.extractor else {
            return article.body.clone();
        };
        if article.link.is_empty() {
            return article.body.clone();
        }

        match extractor.extract(&article.link).await {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::debug!(article_id = %article.id, "No article body found, using feed description");
                article.body.clone()
            }
            Err(e) => {
                tracing::warn!(
                    article_id = %article.id,
                    stage = "extract",
                    "Article fetch failed, using feed description: {}",
                    e
                );
                article.body.clone()
            }
        }
    }

    async fn translate_or_original(&self, text: &str, article_id: &str, stage: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        match self
            .translator
            .translate(text, &self.settings.target_language)
            .await
        {
            Ok(translated) if !translated.trim().is_empty() => translated,
            Ok(_) => {
                tracing::debug!(article_id, stage, "Empty translation, keeping original text");
                text.to_string()
            }
            Err(e) => {
                tracing::warn!(article_id, stage, "Translation failed, keeping original text: {}", e);
                text.to_string()
            }
        }
    }
}
