use crate::domain::model::{Article, PublishReceipt, Summary};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Yields the entries of one feed, in feed order.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str, max_fragments: usize) -> Result<Summary>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &str) -> Result<PublishReceipt>;
}

/// A text-completion backend used by the abstractive summarizers.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn provider(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Fetches the full text of an article page. `Ok(None)` means the page had
/// no recognisable article body.
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Option<String>>;
}
