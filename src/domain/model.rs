use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One feed entry, as ingested. Lives for a single pipeline pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub body: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            link: link.into(),
            published: None,
        }
    }

    /// Short title for log lines.
    pub fn short_title(&self) -> String {
        let mut short: String = self.title.chars().take(50).collect();
        if self.title.chars().count() > 50 {
            short.push_str("...");
        }
        short
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub fragments: Vec<String>,
}

impl Summary {
    pub fn new(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }
}

/// Translated content ready to be rendered and published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub fragments: Vec<String>,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub post_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub feeds_total: usize,
    pub feeds_failed: usize,
    pub fetched: usize,
    pub skipped: usize,
    pub published: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn start(feeds_total: usize) -> Self {
        Self {
            feeds_total,
            feeds_failed: 0,
            fetched: 0,
            skipped: 0,
            published: 0,
            failed: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}
