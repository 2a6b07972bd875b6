use clap::Parser;
use empty_leg_optimizer::config::SourceSettings;
use empty_leg_optimizer::core::report::render_table;
use empty_leg_optimizer::domain::ports::ConfigProvider;
use empty_leg_optimizer::utils::{logger, validation::Validate};
use empty_leg_optimizer::{LocalStorage, MatchEngine, MatchPipeline, OptimizerError, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-matches")]
#[command(about = "Empty-leg detour matching driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "matches.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the detour threshold from config (km)
    #[arg(long)]
    threshold_km: Option<f64>,

    /// Show the configuration without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based matching");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 命令列覆蓋設定
    if let Some(threshold) = args.threshold_km {
        config.detour.detour_threshold_km = threshold;
        tracing::info!("🔧 Detour threshold overridden to: {} km", threshold);
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
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched or written");
        println!("✅ Dry run complete. Remove --dry-run to fetch the fleet and write reports.");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = match config.source.build() {
        Ok(source) => source,
        Err(e) => exit_with(e),
    };

    let display_limit = config.display_limit();
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = MatchPipeline::new(source, storage, config);
    let engine = MatchEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            println!("{}", render_table(&run.report.matches, display_limit));
            if !run.report.skipped.is_empty() {
                println!("⚠️ {} legs skipped, see the JSON report", run.report.skipped.len());
            }
            println!("✅ Matched {} legs", run.report.matches.len());
            println!("📁 Output saved to: {}", run.output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Source: {}", config.source.describe());
    if let Some(user_id) = config.source.user_id() {
        println!("  User filter: {}", user_id);
    }
    if let SourceSettings::Supabase(sb) = &config.source {
        println!("  Timeout: {}s", sb.timeout_seconds);
        println!(
            "  Auth: {}",
            if sb.access_token.is_some() { "user token" } else { "api key" }
        );
    }
    println!("  Detour threshold: {} km", config.detour_threshold_km());
    println!(
        "  Display limit: {}",
        match config.display_limit() {
            0 => "all".to_string(),
            n => n.to_string(),
        }
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    if let Some(bundle) = config.bundle_name() {
        println!("  Compression: {} (ZIP)", bundle);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
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
