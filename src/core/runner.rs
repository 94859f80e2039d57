use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// What a finished run produced and where it was written.
#[derive(Debug)]
pub struct Completed<T> {
    pub output: T,
    pub output_path: String,
}

/// Drives a [`Pipeline`] through extract, transform and load.
pub struct PipelineRunner<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> PipelineRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<Completed<P::Output>> {
        let started = Instant::now();
        tracing::info!("🚀 Starting pipeline");
        self.monitor.log_stage("Start");

        // Extract
        tracing::info!("📥 Extracting catalogue...");
        let catalogue = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} items", catalogue.len());
        self.monitor.log_stage("Extract");

        // Transform
        tracing::info!("🔄 Searching...");
        let output = self.pipeline.transform(catalogue).await?;
        self.monitor.log_stage("Transform");

        // Load
        tracing::info!("💾 Writing results...");
        let output_path = self.pipeline.load(&output).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stage("Load");

        tracing::info!("✅ Pipeline finished in {:?}", started.elapsed());
        self.monitor.log_final_stats();

        Ok(Completed {
            output,
            output_path,
        })
    }
}
