use clap::Parser;
use empty_leg_optimizer::core::report::render_table;
use empty_leg_optimizer::domain::ports::ConfigProvider;
use empty_leg_optimizer::utils::{logger, validation::Validate};
use empty_leg_optimizer::{CliConfig, LocalStorage, MatchEngine, MatchPipeline, OptimizerError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting empty-leg-optimizer CLI");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = config.source_settings()?;
    tracing::info!("📡 Fleet source: {}", settings.describe());
    let source = match settings.build() {
        Ok(source) => source,
        Err(e) => exit_with(e),
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let display_limit = config.display_limit();
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = MatchPipeline::new(source, storage, config);
    let engine = MatchEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            println!("{}", render_table(&run.report.matches, display_limit));
            for skipped in &run.report.skipped {
                println!("⚠️ Skipped {}: {}", skipped.tail_number, skipped.reason);
            }
            println!();
            println!("✅ Matched {} legs", run.report.matches.len());
            println!("📁 Output saved to: {}", run.output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: OptimizerError) -> ! {
    tracing::error!(
        "❌ Matching failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code())
}
