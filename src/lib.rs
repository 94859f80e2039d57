pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, LocalStorage};
pub use config::TomlConfig;

pub use app::pipelines::{BenchmarkPipeline, OptimizePipeline};
pub use core::complexity::{classify, Classification, GrowthFamily};
pub use core::runner::PipelineRunner;
pub use core::search::{SearchEngine, SearchOutcome};
pub use domain::model::{Catalogue, Item, SelectionSummary, Strategy, TimingSample};
pub use utils::error::{OptimizerError, Result};
