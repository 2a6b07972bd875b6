use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use empty_leg_optimizer::config::{CsvSourceConfig, SourceKind, SourceSettings};
use empty_leg_optimizer::core::registry::register_aircraft;
use empty_leg_optimizer::domain::ports::FleetSource;
use empty_leg_optimizer::utils::{logger, validation::Validate};
use empty_leg_optimizer::{NewAircraft, SupabaseConfig};

#[derive(Parser)]
#[command(name = "fleet")]
#[command(about = "List airports and aircraft, or register an aircraft")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs)]
struct SourceArgs {
    #[arg(long, value_enum, default_value = "csv", global = true)]
    source: SourceKind,

    #[arg(long, default_value = "./data", global = true)]
    data_dir: String,

    #[arg(long, env = "SUPABASE_URL", global = true)]
    supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true, global = true)]
    supabase_key: Option<String>,

    #[arg(long, env = "SUPABASE_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    /// Owner id for listing and registering aircraft
    #[arg(long, global = true)]
    user_id: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the airport catalog ordered by code
    Airports,
    /// Print aircraft ordered by tail number
    Aircraft,
    /// Register an aircraft and its next leg
    Register {
        tail_number: String,
        /// Current airport code
        from: String,
        /// Next leg destination code
        to: String,
        #[arg(long)]
        model: Option<String>,
        /// RFC 3339 departure time, e.g. 2025-03-01T14:30:00Z
        #[arg(long)]
        next_leg_time: Option<DateTime<Utc>>,
    },
}

impl SourceArgs {
    fn settings(&self) -> anyhow::Result<SourceSettings> {
        let settings = match self.source {
            SourceKind::Csv => SourceSettings::Csv(CsvSourceConfig {
                data_dir: self.data_dir.clone(),
                user_id: self.user_id.clone(),
                ..Default::default()
            }),
            SourceKind::Supabase => {
                let url = self
                    .supabase_url
                    .clone()
                    .context("--supabase-url (or SUPABASE_URL) is required for the supabase source")?;
                let key = self
                    .supabase_key
                    .clone()
                    .context("--supabase-key (or SUPABASE_KEY) is required for the supabase source")?;
                let mut config = SupabaseConfig::new(url, key);
                config.access_token = self.access_token.clone();
                config.user_id = self.user_id.clone();
                SourceSettings::Supabase(config)
            }
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let settings = cli.source.settings()?;
    tracing::info!("📡 Fleet source: {}", settings.describe());
    let source = settings.build()?;

    match cli.command {
        Command::Airports => list_airports(source.as_ref()).await?,
        Command::Aircraft => list_aircraft(source.as_ref()).await?,
        Command::Register {
            tail_number,
            from,
            to,
            model,
            next_leg_time,
        } => {
            let mut new = NewAircraft::new(tail_number, from, to);
            new.model = model;
            new.next_leg_time = next_leg_time;
            new.user_id = cli.source.user_id.clone();

            let stored = register_aircraft(source.as_ref(), new)
                .await
                .context("aircraft registration failed")?;
            println!(
                "✅ Registered {} (id {}): {} → {}",
                stored.tail_number, stored.id, stored.current_icao, stored.next_leg_icao
            );
        }
    }

    Ok(())
}

async fn list_airports(source: &dyn FleetSource) -> anyhow::Result<()> {
    let mut airports = source.fetch_airports().await?;
    airports.sort_by_key(|a| a.icao.trim().to_uppercase());

    println!("{:<6}  {:<32}  {:<20}  {:>9}  {:>10}", "Code", "Name", "City", "Lat", "Lon");
    for airport in &airports {
        println!(
            "{:<6}  {:<32}  {:<20}  {:>9.4}  {:>10.4}",
            airport.icao.trim().to_uppercase(),
            airport.name,
            airport.city.as_deref().unwrap_or("-"),
            airport.lat,
            airport.lon
        );
    }
    println!("{} airports", airports.len());
    Ok(())
}

async fn list_aircraft(source: &dyn FleetSource) -> anyhow::Result<()> {
    let aircraft = source.fetch_aircraft().await?;

    println!("{:<10}  {:<20}  {:<6}  {:<6}  {}", "Tail #", "Model", "From", "To", "Next leg");
    for ac in &aircraft {
        println!(
            "{:<10}  {:<20}  {:<6}  {:<6}  {}",
            ac.tail_number,
            ac.model.as_deref().unwrap_or("-"),
            ac.current_icao,
            ac.next_leg_icao,
            ac.next_leg_time
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    println!("{} aircraft", aircraft.len());
    Ok(())
}
