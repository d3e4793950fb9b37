pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::storage::{LocalStorage, MemoryStorage};
pub use app::{run_once, RunMode};
pub use config::AppConfig;
pub use core::{ledger::Ledger, pipeline::NewsPipeline};
pub use utils::error::{RelayError, Result};
