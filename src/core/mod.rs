pub mod columns;
pub mod engine;
pub mod features;
pub mod forest;
pub mod labels;
pub mod matcher;
pub mod output;
pub mod reader;
pub mod scoring;
pub mod split;
pub mod summary;

pub use crate::domain::model::{ReconResult, SourceTables};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
