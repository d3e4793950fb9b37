pub mod relay;

pub use relay::{build_pipeline, build_publisher, build_summarizer, build_translator, run_once, RunMode};
