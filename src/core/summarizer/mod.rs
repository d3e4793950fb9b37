pub mod abstractive;
pub mod extractive;
pub mod text;

pub use abstractive::AbstractiveSummarizer;
pub use extractive::ExtractiveSummarizer;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which summarization strategy a run uses. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummarizerKind {
    #[default]
    Extractive,
    RemoteLlm,
    LocalModel,
}

impl SummarizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarizerKind::Extractive => "extractive",
            SummarizerKind::RemoteLlm => "remote-llm",
            SummarizerKind::LocalModel => "local-model",
        }
    }
}

impl fmt::Display for SummarizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummarizerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "extractive" => Ok(SummarizerKind::Extractive),
            "remote-llm" => Ok(SummarizerKind::RemoteLlm),
            "local-model" => Ok(SummarizerKind::LocalModel),
            other => Err(format!(
                "unknown summarizer '{}', expected extractive, remote-llm or local-model",
                other
            )),
        }
    }
}
