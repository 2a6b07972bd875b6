pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvFleetSource, LocalStorage, SupabaseConfig, SupabaseSource};
pub use config::{toml_config::TomlConfig, SourceSettings};
pub use core::{
    detour::{AirportCatalog, DetourFinder},
    engine::{MatchEngine, MatchRun},
    pipeline::MatchPipeline,
};
pub use domain::model::{Aircraft, Airport, LegMatch, NewAircraft, SkippedLeg};
pub use utils::error::{OptimizerError, Result};
