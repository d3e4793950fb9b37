use crate::core::summarizer::extractive::ExtractiveSummarizer;
use crate::core::summarizer::text::{clean_text, split_sentences, truncate_chars};
use crate::domain::model::Summary;
use crate::domain::ports::{CompletionBackend, Summarizer};
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;

const MAX_PROMPT_CHARS: usize = 10_000;

/// Summarizer that asks a generative model for bullet fragments and falls
/// back to [`ExtractiveSummarizer`] whenever the backend fails or answers
/// with something that cannot be parsed.
pub struct AbstractiveSummarizer<B: CompletionBackend> {
    name: String,
    backend: B,
    language: String,
    fallback: ExtractiveSummarizer,
}

impl<B: CompletionBackend> AbstractiveSummarizer<B> {
    pub fn new(name: impl Into<String>, backend: B, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend,
            language: language.into(),
            fallback: ExtractiveSummarizer::new(),
        }
    }

    async fn ask_backend(&self, text: &str, max_fragments: usize) -> Result<Summary> {
        let prompt = build_prompt(text, max_fragments, &self.language);
        let response = self.backend.complete(&prompt).await?;

        let mut fragments = parse_bullets(&response);
        if fragments.is_empty() {
            return Err(RelayError::ProviderError {
                provider: self.backend.provider().to_string(),
                message: "response contained no bullet points".to_string(),
            });
        }
        fragments.truncate(max_fragments);

        Ok(Summary::new(fragments))
    }
}

#[async_trait]
impl<B: CompletionBackend> Summarizer for AbstractiveSummarizer<B> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn summarize(&self, text: &str, max_fragments: usize) -> Result<Summary> {
        let cleaned = clean_text(text);
        let sentences = split_sentences(&cleaned);
        if sentences.len() <= max_fragments {
            return Ok(Summary::new(sentences));
        }

        match self.ask_backend(&cleaned, max_fragments).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::warn!(
                    summarizer = %self.name,
                    provider = self.backend.provider(),
                    "Summarization failed, falling back to extractive: {}",
                    e
                );
                Ok(self.fallback.extract(&cleaned, max_fragments))
            }
        }
    }
}

pub fn build_prompt(text: &str, max_fragments: usize, language: &str) -> String {
    format!(
        r#"You are a news summarization assistant. Summarize the article below in exactly {count} short bullet points.

RULES:
1. Write the bullet points in the same language as the article (language code: {language}).
2. Each bullet point must be a single factual sentence taken from the article.
3. Start every bullet point on its own line with "- ".
4. Do not add a title, introduction or closing remark.

Article:
{article}"#,
        count = max_fragments,
        language = language,
        article = truncate_chars(text, MAX_PROMPT_CHARS),
    )
}

/// Extracts bullet lines (`-`, `*`, `•`, `1.`, `1)`) from a model response.
pub fn parse_bullets(response: &str) -> Vec<String> {
    response
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }

            let stripped = if let Some(rest) = trimmed
                .strip_prefix('-')
                .or_else(|| trimmed.strip_prefix('*'))
                .or_else(|| trimmed.strip_prefix('•'))
            {
                rest
            } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
                let rest = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
                rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?
            } else {
                return None;
            };

            let fragment = stripped.trim();
            if fragment.is_empty() {
                None
            } else {
                Some(fragment.to_string())
            }
        })
        .collect()
}
