use crate::domain::model::{Catalogue, SizeSchedule, Strategy};
use crate::utils::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn catalogue_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn budget(&self) -> Decimal;
    fn strategy(&self) -> Strategy;
    /// Memoization cache capacity; zero disables memoization.
    fn cache_capacity(&self) -> usize;
    fn output_formats(&self) -> &[String];
    fn compress(&self) -> bool;
}

/// Extra settings of a timing experiment.
pub trait ExperimentConfig: ConfigProvider {
    fn experiment_name(&self) -> &str;
    fn size_schedule(&self) -> SizeSchedule;
    /// A sample slower than this ends the experiment.
    fn ceiling(&self) -> Duration;
}

/// Extract a catalogue, transform it into an output, load the output.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Output: Send + Sync + 'static;

    async fn extract(&self) -> Result<Catalogue>;
    async fn transform(&self, catalogue: Catalogue) -> Result<Self::Output>;
    /// Returns where the output was written.
    async fn load(&self, output: &Self::Output) -> Result<String>;
}
