use clap::Parser;
use rust_decimal::Decimal;
use share_optimizer::domain::ports::{ConfigProvider, ExperimentConfig};
use share_optimizer::utils::error::ErrorSeverity;
use share_optimizer::utils::{logger, validation::Validate};
use share_optimizer::{BenchmarkPipeline, LocalStorage, PipelineRunner, Strategy, TomlConfig};

#[derive(Parser)]
#[command(name = "complexity-bench")]
#[command(about = "Measure search time over growing catalogues and classify its growth")]
struct Args {
    /// Path to TOML experiment file
    #[arg(short, long, default_value = "experiment.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the search strategy from config
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Override the budget from config
    #[arg(long)]
    budget: Option<Decimal>,

    /// Dry run - show the schedule without measuring anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting complexity benchmark");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(strategy) = args.strategy {
        config.set_strategy(strategy);
        tracing::info!("🔧 Strategy overridden to: {}", strategy);
    }
    if let Some(budget) = args.budget {
        config.set_budget(budget);
        tracing::info!("🔧 Budget overridden to: {}", budget);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No measurements will be taken");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = BenchmarkPipeline::new(LocalStorage::default(), config);
    let runner = PipelineRunner::new_with_monitoring(pipeline, monitor_enabled);

    match runner.run().await {
        Ok(completed) => {
            let report = &completed.output.report;
            println!("📈 Empirical growth: {}", report.classification.best);
            println!();
            println!("  {:<14} {:>16} {:>18}", "family", "coefficient", "mean abs error");
            for fit in &report.classification.fits {
                if fit.overflowed {
                    println!("  {:<14} {:>16} {:>18}", fit.family.notation(), "-", "overflow");
                } else {
                    println!(
                        "  {:<14} {:>16.6e} {:>18.3}",
                        fit.family.notation(),
                        fit.coefficient,
                        fit.mean_absolute_error
                    );
                }
            }
            println!();
            if report.stopped_early {
                println!("⏱️ Stopped early at {} items (time ceiling reached)", report.largest_size);
            }
            if let Some(space) = &report.search_space {
                println!("🔢 Subsets at {} items: {}", report.largest_size, space);
            }
            println!("📁 Output saved to: {}", completed.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Benchmark failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Experiment Summary:");
    println!("  Experiment: {}", config.experiment_name());
    if let Some(description) = &config.experiment.description {
        println!("  Description: {}", description);
    }
    println!("  Catalogue: {}", config.catalogue_path());
    println!("  Strategy: {}", config.strategy());
    println!("  Budget: {}", config.budget());
    println!("  Cache capacity: {}", config.cache_capacity());
    println!("  Ceiling: {:?}", config.ceiling());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let data = tokio::fs::read(config.catalogue_path()).await?;
    let (catalogue, ingestion) = share_optimizer::adapters::catalogue_csv::parse_catalogue(&data)?;

    println!("📥 Catalogue:");
    println!("  Accepted: {} shares", ingestion.accepted);
    println!("  Rejected: {}", ingestion.rejected());

    let sizes = config.size_schedule().sizes(catalogue.len());
    println!();
    println!("⏱️ Schedule: {} samples", sizes.len());
    match (sizes.first(), sizes.last()) {
        (Some(first), Some(last)) => println!("  Sizes: {} ..= {}", first, last),
        _ => println!("  Nothing to measure"),
    }

    if let Some(&largest) = sizes.last() {
        match share_optimizer::core::complexity::subset_count(largest) {
            Some(count) => println!("  Subsets at {} items: {}", largest, count),
            None => println!("  Subsets at {} items: more than 2^128", largest),
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for per-sample timings during a real run.");

    Ok(())
}
