use crate::core::memo::DEFAULT_CACHE_CAPACITY;
use crate::domain::model::Strategy;
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "share-optimizer")]
#[command(about = "Pick the most profitable set of shares within a budget")]
pub struct CliConfig {
    /// CSV file with name, price and profit columns
    #[arg(long)]
    pub catalogue: String,

    #[arg(long, default_value = "500")]
    pub budget: Decimal,

    #[arg(long, value_enum, default_value_t = Strategy::PrunedGreedy)]
    pub strategy: Strategy,

    /// Memoization cache size, 0 disables memoization
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv,json")]
    pub output_formats: Vec<String>,

    /// Bundle every output file into one ZIP archive
    #[arg(long)]
    pub compress: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn catalogue_path(&self) -> &str {
        &self.catalogue
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn budget(&self) -> Decimal {
        self.budget
    }

    fn strategy(&self) -> Strategy {
        self.strategy
    }

    fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn compress(&self) -> bool {
        self.compress
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("catalogue", &self.catalogue)?;
        validation::validate_file_extensions("catalogue", std::slice::from_ref(&self.catalogue), &["csv"])?;
        validation::validate_budget("budget", self.budget)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        Ok(())
    }
}

/// Filesystem storage. Relative paths resolve against `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}
