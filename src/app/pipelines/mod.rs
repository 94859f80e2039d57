pub mod benchmark_pipeline;
pub mod optimize_pipeline;

pub use benchmark_pipeline::{BenchmarkOutput, BenchmarkPipeline};
pub use optimize_pipeline::{OptimizeOutput, OptimizePipeline};
