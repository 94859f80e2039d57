use crate::adapters::catalogue_csv;
use crate::adapters::report::{self, BenchmarkReport, ReportFile, COMPLEXITY_JSON, TIMINGS_CSV};
use crate::core::complexity::{self, subset_count};
use crate::core::timing::TimingHarness;
use crate::domain::model::{Catalogue, TimingSample};
use crate::domain::ports::{ExperimentConfig, Pipeline, Storage};
use crate::utils::error::{OptimizerError, Result};
use async_trait::async_trait;
use std::path::Path;

pub const BUNDLE_NAME: &str = "complexity_output.zip";

#[derive(Debug, Clone)]
pub struct BenchmarkOutput {
    pub samples: Vec<TimingSample>,
    pub report: BenchmarkReport,
}

/// Times the search over growing catalogue prefixes and classifies the
/// growth of the measurements.
pub struct BenchmarkPipeline<S: Storage, C: ExperimentConfig> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ExperimentConfig> BenchmarkPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait]
impl<S: Storage, C: ExperimentConfig> Pipeline for BenchmarkPipeline<S, C> {
    type Output = BenchmarkOutput;

    async fn extract(&self) -> Result<Catalogue> {
        let data = self.storage.read_file(self.config.catalogue_path()).await?;
        let (catalogue, _) = catalogue_csv::parse_catalogue(&data)?;
        Ok(catalogue)
    }

    async fn transform(&self, catalogue: Catalogue) -> Result<BenchmarkOutput> {
        let strategy = self.config.strategy();
        let budget = self.config.budget();
        let schedule = self.config.size_schedule();
        tracing::info!(
            "🧪 Experiment '{}': {} over {:?} (ceiling {:?})",
            self.config.experiment_name(),
            strategy,
            schedule.sizes(catalogue.len()),
            self.config.ceiling()
        );

        let harness = TimingHarness::new(strategy, budget)
            .with_cache_capacity(self.config.cache_capacity())
            .with_schedule(schedule)
            .with_ceiling(self.config.ceiling());

        let run = tokio::task::spawn_blocking(move || harness.run(&catalogue))
            .await
            .map_err(|e| OptimizerError::ProcessingError {
                message: format!("timing task failed: {}", e),
            })??;

        let classification = complexity::classify(&run.samples)?;
        tracing::info!(
            "📈 Empirical growth: {} ({} samples, {} discarded)",
            classification.best,
            classification.samples_used,
            classification.discarded
        );

        let largest_size = run.samples.iter().map(|s| s.size).max().unwrap_or(0);
        let report = BenchmarkReport {
            experiment: self.config.experiment_name().to_string(),
            strategy,
            budget,
            stopped_early: run.stopped_early,
            largest_size,
            search_space: subset_count(largest_size).map(|count| count.to_string()),
            classification,
            generated_at: chrono::Utc::now(),
        };

        Ok(BenchmarkOutput {
            samples: run.samples,
            report,
        })
    }

    async fn load(&self, output: &BenchmarkOutput) -> Result<String> {
        let mut files = Vec::new();
        for format in self.config.output_formats() {
            match format.as_str() {
                "csv" => files.push(ReportFile::new(TIMINGS_CSV, report::timings_csv(&output.samples)?)),
                "json" => files.push(ReportFile::new(COMPLEXITY_JSON, report::to_json(&output.report)?)),
                other => tracing::warn!("Unsupported output format '{}', skipping", other),
            }
        }

        if self.config.compress() {
            let zip_path = self.output_file(BUNDLE_NAME);
            self.storage.write_file(&zip_path, &report::bundle(&files)?).await?;
            tracing::info!("📦 Output bundle saved: {}", zip_path);
            return Ok(zip_path);
        }

        for file in &files {
            self.storage
                .write_file(&self.output_file(&file.name), &file.contents)
                .await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
