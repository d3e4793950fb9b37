use crate::adapters::article::{parse_selector, DEFAULT_CONTENT_SELECTORS};
use crate::adapters::completion::{DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OPENAI_ENDPOINT};
use crate::adapters::publish::DEFAULT_GRAPH_URL;
use crate::adapters::translate::DEFAULT_TRANSLATE_ENDPOINT;
use crate::core::formatter::PostTemplate;
use crate::core::pipeline::RunSettings;
use crate::core::summarizer::SummarizerKind;
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{
    validate_credential, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_target_language")]
    pub target_language: String,
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub article: ArticleConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub format: PostTemplate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    #[serde(default)]
    pub urls: Vec<String>,
    pub list_file: Option<String>,
    #[serde(default = "default_feed_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default, rename = "type")]
    pub kind: SummarizerKind,
    #[serde(default = "default_max_fragments")]
    pub max_fragments: usize,
    /// Language the article is written in; LLM bullets are requested in it.
    #[serde(default = "default_source_language")]
    pub language: String,
    #[serde(default)]
    pub remote_llm: RemoteLlmConfig,
    #[serde(default)]
    pub local_model: LocalModelConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            kind: SummarizerKind::default(),
            max_fragments: default_max_fragments(),
            language: default_source_language(),
            remote_llm: RemoteLlmConfig::default(),
            local_model: LocalModelConfig::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteLlmConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

impl Default for RemoteLlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl std::fmt::Debug for RemoteLlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteLlmConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: "llama3.2".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub source_language: String,
    pub max_chars: usize,
    pub timeout_seconds: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            source_language: "auto".to_string(),
            max_chars: 5000,
            timeout_seconds: 15,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub page_id: String,
    pub access_token: String,
    #[serde(default = "default_delay")]
    pub delay_seconds: u64,
    pub max_posts: Option<usize>,
    #[serde(default = "default_publish_timeout")]
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherConfig")
            .field("graph_url", &self.graph_url)
            .field("api_version", &self.api_version)
            .field("page_id", &self.page_id)
            .field("access_token", &"<redacted>")
            .field("delay_seconds", &self.delay_seconds)
            .field("max_posts", &self.max_posts)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Full-article fetching. Off by default: the feed description is summarized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    pub fetch_full_text: bool,
    pub selectors: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            fetch_full_text: false,
            selectors: DEFAULT_CONTENT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            timeout_seconds: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: "posted.json".to_string(),
        }
    }
}

fn default_target_language() -> String {
    "bn".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_feed_timeout() -> u64 {
    20
}

fn default_max_fragments() -> usize {
    3
}

fn default_graph_url() -> String {
    DEFAULT_GRAPH_URL.to_string()
}

fn default_api_version() -> String {
    "v19.0".to_string()
}

fn default_delay() -> u64 {
    2
}

fn default_publish_timeout() -> u64 {
    30
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RelayError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| RelayError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FB_PAGE_TOKEN})；未設定的變數保持原樣，交給驗證處理
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Inline `feeds.urls` followed by the entries of `feeds.list_file`,
    /// without duplicates and in that order.
    pub fn feed_urls(&self) -> Result<Vec<String>> {
        let mut urls: Vec<String> = Vec::new();
        let mut push = |url: String| {
            if !urls.contains(&url) {
                urls.push(url);
            }
        };

        for url in &self.feeds.urls {
            push(url.trim().to_string());
        }

        if let Some(list_file) = &self.feeds.list_file {
            let content =
                std::fs::read_to_string(list_file).map_err(|e| RelayError::ConfigError {
                    message: format!("cannot read feed list {}: {}", list_file, e),
                })?;
            let listed: Vec<String> =
                serde_json::from_str(&content).map_err(|e| RelayError::ConfigValidationError {
                    field: "feeds.list_file".to_string(),
                    message: format!("{} is not a JSON array of URLs: {}", list_file, e),
                })?;
            for url in listed {
                push(url.trim().to_string());
            }
        }

        Ok(urls)
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            max_fragments: self.summarizer.max_fragments,
            target_language: self.target_language.clone(),
            publish_delay: Duration::from_secs(self.publisher.delay_seconds),
            max_posts: self.publisher.max_posts,
            template: self.format.clone(),
        }
    }

    /// Checks everything a dry run needs; publishing credentials are left
    /// to [`Validate::validate`].
    pub fn validate_offline(&self) -> Result<()> {
        validate_non_empty_string("target_language", &self.target_language)?;

        if self.feeds.urls.is_empty() && self.feeds.list_file.is_none() {
            return Err(RelayError::MissingConfigError {
                field: "feeds.urls".to_string(),
            });
        }
        for url in &self.feeds.urls {
            validate_url("feeds.urls", url.trim())?;
        }
        if let Some(list_file) = &self.feeds.list_file {
            validate_path("feeds.list_file", list_file)?;
        }
        validate_positive_number("feeds.timeout_seconds", self.feeds.timeout_seconds as usize, 1)?;

        validate_positive_number("summarizer.max_fragments", self.summarizer.max_fragments, 1)?;
        match self.summarizer.kind {
            SummarizerKind::Extractive => {}
            SummarizerKind::RemoteLlm => {
                let remote = &self.summarizer.remote_llm;
                validate_url("summarizer.remote_llm.endpoint", &remote.endpoint)?;
                validate_non_empty_string("summarizer.remote_llm.model", &remote.model)?;
                validate_credential("OPENAI_API_KEY", &remote.api_key)?;
            }
            SummarizerKind::LocalModel => {
                let local = &self.summarizer.local_model;
                validate_url("summarizer.local_model.endpoint", &local.endpoint)?;
                validate_non_empty_string("summarizer.local_model.model", &local.model)?;
            }
        }

        if self.translation.enabled {
            validate_url("translation.endpoint", &self.translation.endpoint)?;
            validate_positive_number("translation.max_chars", self.translation.max_chars, 1)?;
        }

        if self.article.fetch_full_text {
            if self.article.selectors.is_empty() {
                return Err(RelayError::MissingConfigError {
                    field: "article.selectors".to_string(),
                });
            }
            for selector in &self.article.selectors {
                parse_selector(selector)?;
            }
            validate_positive_number(
                "article.timeout_seconds",
                self.article.timeout_seconds as usize,
                1,
            )?;
        }

        validate_range("publisher.delay_seconds", self.publisher.delay_seconds, 0, 3600)?;
        if let Some(max_posts) = self.publisher.max_posts {
            validate_positive_number("publisher.max_posts", max_posts, 1)?;
        }

        validate_path("ledger.path", &self.ledger.path)?;
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_offline()?;

        validate_url("publisher.graph_url", &self.publisher.graph_url)?;
        validate_non_empty_string("publisher.api_version", &self.publisher.api_version)?;
        validate_credential("FB_PAGE_ID", &self.publisher.page_id)?;
        validate_credential("FB_PAGE_TOKEN", &self.publisher.access_token)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[feeds]
urls = ["https://www.svt.se/nyheter/rss.xml"]

[publisher]
page_id = "12345"
access_token = "EAAB-token"
"#;

    #[test]
    fn test_parse_minimal_config_fills_defaults() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.target_language, "bn");
        assert_eq!(config.summarizer.kind, SummarizerKind::Extractive);
        assert_eq!(config.summarizer.max_fragments, 3);
        assert_eq!(config.publisher.api_version, "v19.0");
        assert_eq!(config.publisher.delay_seconds, 2);
        assert_eq!(config.ledger.path, "posted.json");
        assert_eq!(config.format, PostTemplate::default());
        assert!(config.translation.enabled);
        assert!(!config.article.fetch_full_text);
        assert_eq!(config.article.selectors[0], ".post-content");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_article_selectors_are_validated() {
        let toml_content = r#"
[feeds]
urls = ["https://example.se/rss"]

[article]
fetch_full_text = true
selectors = [".article-body", "div["]

[publisher]
page_id = "12345"
access_token = "EAAB-token"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.article.selectors.len(), 2);
        assert!(matches!(
            config.validate(),
            Err(RelayError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
target_language = "en"

[feeds]
urls = ["https://example.se/rss"]
timeout_seconds = 10

[summarizer]
type = "local-model"
max_fragments = 2
language = "sv"

[summarizer.local_model]
model = "mistral"

[translation]
enabled = false

[publisher]
page_id = "12345"
access_token = "EAAB-token"
delay_seconds = 5
max_posts = 1

[ledger]
path = "state/posted.json"

[format]
title_label = "Title"
summary_label = "Summary"
source_label = "Source"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.summarizer.kind, SummarizerKind::LocalModel);
        assert_eq!(config.summarizer.local_model.model, "mistral");
        assert_eq!(config.summarizer.local_model.endpoint, DEFAULT_OLLAMA_ENDPOINT);
        assert!(!config.translation.enabled);

        let settings = config.run_settings();
        assert_eq!(settings.max_fragments, 2);
        assert_eq!(settings.target_language, "en");
        assert_eq!(settings.publish_delay, Duration::from_secs(5));
        assert_eq!(settings.max_posts, Some(1));
        assert_eq!(settings.template.title_label, "Title");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("NEWS_RELAY_TEST_TOKEN", "EAAB-from-env");

        let toml_content = r#"
[feeds]
urls = ["https://example.se/rss"]

[publisher]
page_id = "12345"
access_token = "${NEWS_RELAY_TEST_TOKEN}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.publisher.access_token, "EAAB-from-env");

        std::env::remove_var("NEWS_RELAY_TEST_TOKEN");
    }

    #[test]
    fn test_unset_credential_is_fatal() {
        let toml_content = r#"
[feeds]
urls = ["https://example.se/rss"]

[publisher]
page_id = "12345"
access_token = "${NEWS_RELAY_UNSET_TOKEN_FOR_TEST}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();

        assert!(matches!(err, RelayError::MissingCredentialsError { .. }));
        assert!(err.is_fatal());
        // 乾跑不需要發文憑證
        assert!(config.validate_offline().is_ok());
    }

    #[test]
    fn test_remote_llm_requires_api_key() {
        let toml_content = r#"
[feeds]
urls = ["https://example.se/rss"]

[summarizer]
type = "remote-llm"

[publisher]
page_id = "12345"
access_token = "EAAB-token"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(RelayError::MissingCredentialsError { .. })
        ));
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config = AppConfig::from_toml_str(MINIMAL).unwrap();
        config.feeds.urls = vec!["invalid-url".to_string()];
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_toml_str(MINIMAL).unwrap();
        config.summarizer.max_fragments = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_toml_str(MINIMAL).unwrap();
        config.feeds.urls.clear();
        assert!(matches!(
            config.validate(),
            Err(RelayError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_unknown_summarizer_type_is_rejected() {
        let toml_content = r#"
[feeds]
urls = ["https://example.se/rss"]

[summarizer]
type = "sumy"

[publisher]
page_id = "12345"
access_token = "EAAB-token"
"#;

        assert!(AppConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_feed_urls_merges_list_file() {
        let mut list_file = NamedTempFile::new().unwrap();
        list_file
            .write_all(br#"["https://example.se/rss", "https://www.dn.se/rss/"]"#)
            .unwrap();

        let mut config = AppConfig::from_toml_str(MINIMAL).unwrap();
        config.feeds.urls = vec!["https://example.se/rss".to_string()];
        config.feeds.list_file = Some(list_file.path().to_str().unwrap().to_string());

        assert_eq!(
            config.feed_urls().unwrap(),
            vec!["https://example.se/rss", "https://www.dn.se/rss/"]
        );
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.publisher.page_id, "12345");

        assert!(AppConfig::from_file("/nonexistent/news-relay.toml").is_err());
    }
}
