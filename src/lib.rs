pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::recon_pipeline::ReconPipeline;
pub use config::{cli::LocalStorage, settings::ReconSettings, toml_config::TomlConfig};
pub use crate::core::engine::{ReconEngine, RunOutcome};
pub use utils::error::{ReconError, Result};
