use crate::core::summarizer::SummarizerKind;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "news-relay")]
#[command(about = "Relays new RSS articles as summarized, translated Facebook posts")]
#[command(version)]
pub struct CliArgs {
    #[arg(short, long, default_value = "news-relay.toml", help = "Path to the TOML configuration")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log posts instead of publishing; the ledger file is not modified")]
    pub dry_run: bool,

    #[arg(long, help = "Stop after this many successful posts")]
    pub max_posts: Option<usize>,

    #[arg(long, help = "Override summarizer.type (extractive, remote-llm, local-model)")]
    pub summarizer: Option<SummarizerKind>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
