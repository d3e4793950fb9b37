pub mod formatter;
pub mod ledger;
pub mod pipeline;
pub mod summarizer;

pub use crate::domain::model::{Article, Post, PublishReceipt, RunReport, Summary};
pub use crate::domain::ports::{FeedSource, Publisher, Storage, Summarizer, Translator};
pub use crate::utils::error::Result;
