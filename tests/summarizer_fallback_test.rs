use anyhow::Result;
use httpmock::prelude::*;
use news_relay::app::build_summarizer;
use news_relay::config::toml_config::SummarizerConfig;
use news_relay::core::summarizer::{ExtractiveSummarizer, SummarizerKind};
use serde_json::json;
use std::time::Duration;

const ARTICLE: &str = "<p>The central bank raised its policy rate by a quarter point on Tuesday.</p>\
    <p>Inflation has stayed above the central bank target for two years.</p>\
    <p>Analysts expect the central bank to hold the rate steady for the rest of the year.</p>\
    <p>The krona strengthened after the announcement.</p>\
    <p>Read more at https://example.se/rates or contact news@example.se.</p>";

fn remote_llm(server: &MockServer, timeout_seconds: u64) -> SummarizerConfig {
    let mut config = SummarizerConfig {
        kind: SummarizerKind::RemoteLlm,
        max_fragments: 2,
        ..SummarizerConfig::default()
    };
    config.remote_llm.endpoint = server.base_url();
    config.remote_llm.api_key = "sk-test".to_string();
    config.remote_llm.timeout_seconds = timeout_seconds;
    config
}

#[tokio::test]
async fn test_remote_llm_timeout_falls_back_to_extractive() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(json!({"choices": [{"message": {"content": "- too late"}}]}));
    });

    let summarizer = build_summarizer(&remote_llm(&server, 1))?;
    let summary = summarizer.summarize(ARTICLE, 2).await?;

    assert_eq!(summary, ExtractiveSummarizer::new().extract(ARTICLE, 2));
    assert_eq!(summary.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_remote_llm_rate_limit_falls_back_to_extractive() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429)
            .json_body(json!({"error": {"message": "Rate limit reached"}}));
    });

    let summarizer = build_summarizer(&remote_llm(&server, 5))?;
    let summary = summarizer.summarize(ARTICLE, 2).await?;

    assert_eq!(summary, ExtractiveSummarizer::new().extract(ARTICLE, 2));
    Ok(())
}

#[tokio::test]
async fn test_remote_llm_bullets_are_used_when_provider_answers() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{"message": {"content": "- Rate raised by a quarter point.\n- Inflation above target."}}]
        }));
    });

    let summarizer = build_summarizer(&remote_llm(&server, 5))?;
    let summary = summarizer.summarize(ARTICLE, 2).await?;

    assert_eq!(
        summary.fragments,
        vec!["Rate raised by a quarter point.", "Inflation above target."]
    );
    Ok(())
}

#[tokio::test]
async fn test_local_model_down_falls_back_to_extractive() -> Result<()> {
    let mut config = SummarizerConfig {
        kind: SummarizerKind::LocalModel,
        ..SummarizerConfig::default()
    };
    config.local_model.endpoint = "http://127.0.0.1:9".to_string();
    config.local_model.timeout_seconds = 2;

    let summarizer = build_summarizer(&config)?;
    let summary = summarizer.summarize(ARTICLE, 2).await?;

    assert_eq!(summary, ExtractiveSummarizer::new().extract(ARTICLE, 2));
    Ok(())
}
