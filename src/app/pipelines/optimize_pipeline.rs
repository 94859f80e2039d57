use crate::adapters::catalogue_csv::{self, IngestionReport};
use crate::adapters::report::{self, ReportFile, RunReport, SELECTION_CSV, SUMMARY_JSON};
use crate::core::complexity::subset_count;
use crate::core::search::SearchEngine;
use crate::core::selector;
use crate::domain::model::{Catalogue, SelectionSummary};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{OptimizerError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tokio::sync::Mutex;

pub const BUNDLE_NAME: &str = "share_optimizer_output.zip";

/// Result of one search run, handed from transform to load.
#[derive(Debug, Clone)]
pub struct OptimizeOutput {
    pub summary: SelectionSummary,
    pub report: RunReport,
}

/// Reads a catalogue, searches it once and writes the selection.
pub struct OptimizePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    ingestion: Mutex<IngestionReport>,
}

impl<S: Storage, C: ConfigProvider> OptimizePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            ingestion: Mutex::new(IngestionReport::default()),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for OptimizePipeline<S, C> {
    type Output = OptimizeOutput;

    async fn extract(&self) -> Result<Catalogue> {
        let path = self.config.catalogue_path();
        tracing::debug!("Reading catalogue from: {}", path);

        let data = self.storage.read_file(path).await?;
        let (catalogue, ingestion) = catalogue_csv::parse_catalogue(&data)?;
        *self.ingestion.lock().await = ingestion;

        Ok(catalogue)
    }

    async fn transform(&self, catalogue: Catalogue) -> Result<OptimizeOutput> {
        let strategy = self.config.strategy();
        let budget = self.config.budget();
        let engine = SearchEngine::new(strategy).with_cache_capacity(self.config.cache_capacity());
        tracing::info!(
            "🔧 Strategy: {}, budget: {}, cache capacity: {}",
            strategy,
            budget,
            engine.cache_capacity()
        );

        let sort_started = Instant::now();
        let prepared = strategy.prepare(&catalogue);
        let sort_duration = sort_started.elapsed();
        tracing::info!("🔀 Sorted {} items in {:?}", prepared.len(), sort_duration);

        // 搜尋是 CPU 密集工作，移出非同步執行緒
        let search_started = Instant::now();
        let (prepared, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = engine.run(&prepared, budget);
            (prepared, outcome)
        })
        .await
        .map_err(|e| OptimizerError::ProcessingError {
            message: format!("search task failed: {}", e),
        })?;
        let outcome = outcome?;
        let search_duration = search_started.elapsed();
        tracing::info!(
            "🔍 Search finished in {:?}: {} states expanded",
            search_duration,
            outcome.statistics.states_expanded
        );

        let summary = selector::select(&prepared, budget, &outcome.best)?;
        selector::verify(&summary)?;

        let report = RunReport {
            strategy,
            budget,
            selected: summary.ids().into_iter().map(str::to_string).collect(),
            count: summary.count,
            total_cost: summary.total_cost,
            total_benefit: summary.total_benefit,
            final_balance: summary.final_balance,
            catalogue_size: prepared.len(),
            search_space: subset_count(prepared.len()).map(|count| count.to_string()),
            ingestion: *self.ingestion.lock().await,
            statistics: outcome.statistics,
            sort_duration_us: sort_duration.as_nanos() as f64 / 1_000.0,
            search_duration_us: search_duration.as_nanos() as f64 / 1_000.0,
            generated_at: chrono::Utc::now(),
        };

        Ok(OptimizeOutput { summary, report })
    }

    async fn load(&self, output: &OptimizeOutput) -> Result<String> {
        let mut files = Vec::new();
        for format in self.config.output_formats() {
            match format.as_str() {
                "csv" => files.push(ReportFile::new(
                    SELECTION_CSV,
                    report::selection_csv(&output.summary)?,
                )),
                "json" => files.push(ReportFile::new(SUMMARY_JSON, report::to_json(&output.report)?)),
                other => tracing::warn!("Unsupported output format '{}', skipping", other),
            }
        }

        if self.config.compress() {
            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = report::bundle(&files)?;
            let zip_path = self.output_file(BUNDLE_NAME);
            self.storage.write_file(&zip_path, &zip_data).await?;
            tracing::info!("📦 Output bundle saved: {}", zip_path);
            return Ok(zip_path);
        }

        for file in &files {
            let path = self.output_file(&file.name);
            tracing::debug!("Writing {} ({} bytes)", path, file.contents.len());
            self.storage.write_file(&path, &file.contents).await?;
        }

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Strategy;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                OptimizerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }
    }

    struct TestConfig {
        strategy: Strategy,
        budget: Decimal,
        formats: Vec<String>,
        compress: bool,
    }

    impl TestConfig {
        fn new(strategy: Strategy, budget: i64) -> Self {
            Self {
                strategy,
                budget: Decimal::from(budget),
                formats: vec!["csv".to_string(), "json".to_string()],
                compress: false,
            }
        }
    }

    impl ConfigProvider for TestConfig {
        fn catalogue_path(&self) -> &str {
            "shares.csv"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn budget(&self) -> Decimal {
            self.budget
        }

        fn strategy(&self) -> Strategy {
            self.strategy
        }

        fn cache_capacity(&self) -> usize {
            1_000
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn compress(&self) -> bool {
            self.compress
        }
    }

    const SHARES: &str = "name,price,profit\nA,100,10\nB,200,8\nC,50,20\nD,-5,3\n";

    async fn pipeline_with(config: TestConfig) -> (OptimizePipeline<MockStorage, TestConfig>, MockStorage) {
        let storage = MockStorage::default();
        storage.put("shares.csv", SHARES.as_bytes()).await;
        (OptimizePipeline::new(storage.clone(), config), storage)
    }

    #[tokio::test]
    async fn test_extract_cleans_catalogue() {
        let (pipeline, _) = pipeline_with(TestConfig::new(Strategy::Exhaustive, 250)).await;

        let catalogue = pipeline.extract().await.unwrap();
        assert_eq!(catalogue.len(), 3);
        assert_eq!(pipeline.ingestion.lock().await.rejected_non_positive, 1);
    }

    #[tokio::test]
    async fn test_transform_finds_best_selection() {
        let (pipeline, _) = pipeline_with(TestConfig::new(Strategy::Exhaustive, 250)).await;

        let catalogue = pipeline.extract().await.unwrap();
        let output = pipeline.transform(catalogue).await.unwrap();

        let mut ids = output.summary.ids();
        ids.sort_unstable();
        assert_eq!(ids, vec!["B", "C"]);
        assert_eq!(output.report.total_benefit, Decimal::from(26));
        assert_eq!(output.report.search_space.as_deref(), Some("7"));
        assert!(output.report.statistics.states_expanded > 0);
    }

    #[tokio::test]
    async fn test_load_writes_each_format() {
        let (pipeline, storage) = pipeline_with(TestConfig::new(Strategy::PrunedGreedy, 250)).await;

        let catalogue = pipeline.extract().await.unwrap();
        let output = pipeline.transform(catalogue).await.unwrap();
        let path = pipeline.load(&output).await.unwrap();

        assert_eq!(path, "out");
        let csv = storage.get_file(&pipeline.output_file(SELECTION_CSV)).await.unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("name,price,profit,benefit"));

        let json = storage.get_file(&pipeline.output_file(SUMMARY_JSON)).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["strategy"], "pruned-greedy");
        assert_eq!(value["count"], 2);
    }

    #[tokio::test]
    async fn test_load_bundles_when_compressed() {
        let mut config = TestConfig::new(Strategy::Greedy, 250);
        config.compress = true;
        let (pipeline, storage) = pipeline_with(config).await;

        let catalogue = pipeline.extract().await.unwrap();
        let output = pipeline.transform(catalogue).await.unwrap();
        let path = pipeline.load(&output).await.unwrap();

        assert_eq!(path, pipeline.output_file(BUNDLE_NAME));
        assert!(storage.get_file(&path).await.is_some());
        assert!(storage.get_file(&pipeline.output_file(SELECTION_CSV)).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_catalogue_is_io_error() {
        let pipeline = OptimizePipeline::new(
            MockStorage::default(),
            TestConfig::new(Strategy::PrunedGreedy, 100),
        );

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, OptimizerError::IoError(_)));
    }
}
