use clap::Parser;
use share_optimizer::utils::error::ErrorSeverity;
use share_optimizer::utils::{logger, validation::Validate};
use share_optimizer::{CliConfig, LocalStorage, OptimizePipeline, PipelineRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting share-optimizer CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 路徑皆相對於工作目錄
    let storage = LocalStorage::default();
    let pipeline = OptimizePipeline::new(storage, config);
    let runner = PipelineRunner::new_with_monitoring(pipeline, monitor_enabled);

    match runner.run().await {
        Ok(completed) => {
            let summary = &completed.output.summary;
            println!("✅ {} shares selected:", summary.count);
            for item in &summary.items {
                println!(
                    "  {} (price {}, profit {}%, benefit {})",
                    item.id(),
                    item.price(),
                    item.profit_rate(),
                    item.benefit()
                );
            }
            println!("💰 Total cost: {}", summary.total_cost);
            println!("📈 Total benefit: {}", summary.total_benefit);
            println!("💵 Remaining balance: {}", summary.final_balance);
            println!("📁 Output saved to: {}", completed.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Optimization failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,      // 警告，但成功
                ErrorSeverity::Medium => 2,   // 重試錯誤
                ErrorSeverity::High => 1,     // 處理錯誤
                ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
