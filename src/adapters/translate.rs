use crate::core::summarizer::text::truncate_chars;
use crate::domain::ports::Translator;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Google Translate web endpoint (`client=gtx`), the same service the
/// `googletrans` family of libraries talks to.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    source_language: String,
    max_chars: usize,
}

impl GoogleTranslator {
    pub fn new(
        endpoint: impl Into<String>,
        source_language: impl Into<String>,
        max_chars: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            source_language: source_language.into(),
            max_chars,
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Ok(String::new());
        }
        let query = truncate_chars(&normalized, self.max_chars);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", target_language),
                ("dt", "t"),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| RelayError::TranslationError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::TranslationError {
                message: format!("HTTP {}", status),
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| RelayError::TranslationError {
                    message: format!("invalid response: {}", e),
                })?;

        // 回應格式: [[["譯文", "原文", ...], ...], ...]
        let translated: String = body
            .get(0)
            .and_then(|segments| segments.as_array())
            .map(|segments| {
                segments
                    .iter()
                    .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if translated.is_empty() {
            return Err(RelayError::TranslationError {
                message: "response contained no translated segments".to_string(),
            });
        }

        Ok(translated)
    }
}

/// Used when translation is disabled; returns the input untouched.
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str, _target_language: &str) -> Result<String> {
        Ok(text.to_string())
    }
}
