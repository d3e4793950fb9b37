use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing credentials: {name}")]
    MissingCredentialsError { name: String },

    #[error("Ledger '{path}' failed: {message}")]
    LedgerError { path: String, message: String },

    #[error("Feed '{url}' failed: {message}")]
    FeedError { url: String, message: String },

    #[error("{provider} provider failed: {message}")]
    ProviderError { provider: String, message: String },

    #[error("Translation failed: {message}")]
    TranslationError { message: String },

    #[error("Publish failed: {message}")]
    PublishError {
        status: Option<u16>,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Credentials,
    Ledger,
    Network,
    Feed,
    Summarization,
    Translation,
    Publishing,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RelayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::HttpError(_) => ErrorCategory::Network,
            RelayError::IoError(_) => ErrorCategory::Ledger,
            RelayError::SerializationError(_) => ErrorCategory::Data,
            RelayError::ConfigError { .. }
            | RelayError::ConfigValidationError { .. }
            | RelayError::MissingConfigError { .. }
            | RelayError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            RelayError::MissingCredentialsError { .. } => ErrorCategory::Credentials,
            RelayError::LedgerError { .. } => ErrorCategory::Ledger,
            RelayError::FeedError { .. } => ErrorCategory::Feed,
            RelayError::ProviderError { .. } => ErrorCategory::Summarization,
            RelayError::TranslationError { .. } => ErrorCategory::Translation,
            RelayError::PublishError { .. } => ErrorCategory::Publishing,
        }
    }

    /// Per-item failures are `Low`, per-run failures `Medium`, anything that
    /// must abort the run is `Critical`.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Summarization | ErrorCategory::Translation => ErrorSeverity::Low,
            ErrorCategory::Feed | ErrorCategory::Publishing | ErrorCategory::Network => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Credentials | ErrorCategory::Ledger => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RelayError::MissingCredentialsError { name } => {
                format!("Export {} in the environment before running", name)
            }
            RelayError::LedgerError { path, .. } => format!(
                "Inspect {} and restore it from version control or a backup; it must be a JSON array of strings",
                path
            ),
            RelayError::IoError(_) => {
                "Check that the ledger directory exists and is writable".to_string()
            }
            RelayError::ConfigError { .. }
            | RelayError::ConfigValidationError { .. }
            | RelayError::MissingConfigError { .. }
            | RelayError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again".to_string()
            }
            RelayError::FeedError { .. } | RelayError::HttpError(_) => {
                "Check network connectivity and the feed URLs".to_string()
            }
            RelayError::PublishError { .. } => {
                "Verify the page token is still valid; the article will be retried on the next run"
                    .to_string()
            }
            RelayError::ProviderError { .. } => {
                "Check the summarizer endpoint and API key".to_string()
            }
            RelayError::TranslationError { .. } => {
                "The translation service may be throttling requests".to_string()
            }
            RelayError::SerializationError(_) => "Unexpected data format".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.severity() {
            ErrorSeverity::Critical => format!("Run aborted: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
