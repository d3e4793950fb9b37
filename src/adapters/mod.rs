pub mod article;
pub mod completion;
pub mod feed;
pub mod publish;
pub mod storage;
pub mod translate;
