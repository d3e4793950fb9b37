use crate::adapters::article::HtmlArticleExtractor;
use crate::adapters::completion::{OllamaBackend, OpenAiBackend};
use crate::adapters::feed::RssFeedSource;
use crate::adapters::publish::{DryRunPublisher, FacebookPublisher};
use crate::adapters::storage::{LocalStorage, MemoryStorage};
use crate::adapters::translate::{GoogleTranslator, PassthroughTranslator};
use crate::config::toml_config::{AppConfig, PublisherConfig, SummarizerConfig, TranslationConfig};
use crate::core::ledger::Ledger;
use crate::core::pipeline::NewsPipeline;
use crate::core::summarizer::{AbstractiveSummarizer, ExtractiveSummarizer, SummarizerKind};
use crate::domain::model::RunReport;
use crate::domain::ports::{Publisher, Storage, Summarizer, Translator};
use crate::utils::error::{RelayError, Result};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Publish for real and persist the ledger.
    Live,
    /// Log posts and keep ledger changes in memory.
    DryRun,
}

/// The one summarizer variant this run uses.
pub fn build_summarizer(config: &SummarizerConfig) -> Result<Box<dyn Summarizer>> {
    let summarizer: Box<dyn Summarizer> = match config.kind {
        SummarizerKind::Extractive => Box::new(ExtractiveSummarizer::new()),
        SummarizerKind::RemoteLlm => {
            let remote = &config.remote_llm;
            let backend = OpenAiBackend::new(
                &remote.endpoint,
                &remote.model,
                &remote.api_key,
                Duration::from_secs(remote.timeout_seconds),
            )?;
            Box::new(AbstractiveSummarizer::new(
                config.kind.as_str(),
                backend,
                &config.language,
            ))
        }
        SummarizerKind::LocalModel => {
            let local = &config.local_model;
            let backend = OllamaBackend::new(
                &local.endpoint,
                &local.model,
                Duration::from_secs(local.timeout_seconds),
            )?;
            Box::new(AbstractiveSummarizer::new(
                config.kind.as_str(),
                backend,
                &config.language,
            ))
        }
    };
    Ok(summarizer)
}

pub fn build_translator(config: &TranslationConfig) -> Result<Box<dyn Translator>> {
    if !config.enabled {
        return Ok(Box::new(PassthroughTranslator));
    }
    Ok(Box::new(GoogleTranslator::new(
        &config.endpoint,
        &config.source_language,
        config.max_chars,
        Duration::from_secs(config.timeout_seconds),
    )?))
}

pub fn build_publisher(config: &PublisherConfig, mode: RunMode) -> Result<Box<dyn Publisher>> {
    match mode {
        RunMode::DryRun => Ok(Box::new(DryRunPublisher::new())),
        RunMode::Live => Ok(Box::new(FacebookPublisher::new(
            &config.graph_url,
            &config.api_version,
            &config.page_id,
            &config.access_token,
            Duration::from_secs(config.timeout_seconds),
        )?)),
    }
}

/// Wires every adapter from `config` around a ledger kept in `storage`.
pub async fn build_pipeline<S: Storage>(
    config: &AppConfig,
    storage: S,
    mode: RunMode,
) -> Result<NewsPipeline<S>> {
    let feeds = config.feed_urls()?;
    let ledger = Ledger::load(storage, &config.ledger.path).await?;

    let pipeline = NewsPipeline::new(
        feeds,
        Box::new(RssFeedSource::new(Duration::from_secs(config.feeds.timeout_seconds))?),
        build_summarizer(&config.summarizer)?,
        build_translator(&config.translation)?,
        build_publisher(&config.publisher, mode)?,
        ledger,
        config.run_settings(),
    );

    if !config.article.fetch_full_text {
        return Ok(pipeline);
    }
    let extractor = HtmlArticleExtractor::new(
        config.article.selectors.clone(),
        Duration::from_secs(config.article.timeout_seconds),
    )?;
    Ok(pipeline.with_extractor(Box::new(extractor)))
}

/// Runs the pipeline once against the on-disk ledger. A dry run reads the
/// ledger file but never writes it.
pub async fn run_once(config: &AppConfig, mode: RunMode) -> Result<RunReport> {
    match mode {
        RunMode::Live => {
            let storage = LocalStorage::new(".".to_string());
            build_pipeline(config, storage, mode).await?.run().await
        }
        RunMode::DryRun => {
            let storage = snapshot_ledger(&config.ledger.path)?;
            build_pipeline(config, storage, mode).await?.run().await
        }
    }
}

fn snapshot_ledger(path: &str) -> Result<MemoryStorage> {
    match std::fs::read(path) {
        Ok(data) => Ok(MemoryStorage::with_file(path, &data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MemoryStorage::new()),
        Err(e) => Err(RelayError::LedgerError {
            path: path.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(summarizer: &str) -> AppConfig {
        let toml_content = format!(
            r#"
[feeds]
urls = ["https://example.se/rss"]

[summarizer]
type = "{}"

[summarizer.remote_llm]
api_key = "sk-test"

[publisher]
page_id = "12345"
access_token = "EAAB-token"
"#,
            summarizer
        );
        AppConfig::from_toml_str(&toml_content).unwrap()
    }

    #[test]
    fn test_build_summarizer_picks_configured_variant() {
        for name in ["extractive", "remote-llm", "local-model"] {
            let summarizer = build_summarizer(&config(name).summarizer).unwrap();
            assert_eq!(summarizer.name(), name);
        }
    }

    #[tokio::test]
    async fn test_disabled_translation_passes_text_through() {
        let mut config = config("extractive");
        config.translation.enabled = false;

        let translator = build_translator(&config.translation).unwrap();
        assert_eq!(translator.translate("Hej", "bn").await.unwrap(), "Hej");
    }

    #[tokio::test]
    async fn test_build_pipeline_loads_existing_ledger() {
        let storage = MemoryStorage::with_file("posted.json", br#"["a1"]"#);
        let pipeline = build_pipeline(&config("extractive"), storage, RunMode::DryRun)
            .await
            .unwrap();

        assert!(pipeline.ledger().contains("a1"));
    }

    #[test]
    fn test_snapshot_of_missing_ledger_is_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("posted.json");

        assert!(snapshot_ledger(path.to_str().unwrap()).is_ok());
    }
}
