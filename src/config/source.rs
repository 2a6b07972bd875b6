use crate::adapters::csv_source::{DEFAULT_AIRCRAFT_FILE, DEFAULT_AIRPORTS_FILE};
use crate::adapters::{CsvFleetSource, LocalStorage, SupabaseConfig, SupabaseSource};
use crate::domain::ports::FleetSource;
use crate::utils::error::{OptimizerError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvSourceConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_airports_file")]
    pub airports_file: String,
    #[serde(default = "default_aircraft_file")]
    pub aircraft_file: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_airports_file() -> String {
    DEFAULT_AIRPORTS_FILE.to_string()
}

fn default_aircraft_file() -> String {
    DEFAULT_AIRCRAFT_FILE.to_string()
}

impl Default for CsvSourceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            airports_file: default_airports_file(),
            aircraft_file: default_aircraft_file(),
            user_id: None,
        }
    }
}

/// 資料來源設定，TOML 中以 `type = "csv"` 或 `type = "supabase"` 區分
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSettings {
    Csv(CsvSourceConfig),
    Supabase(SupabaseConfig),
}

impl SourceSettings {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Csv(_) => "csv",
            Self::Supabase(_) => "supabase",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Csv(csv) => format!(
                "CSV ({}/{}, {}/{})",
                csv.data_dir, csv.airports_file, csv.data_dir, csv.aircraft_file
            ),
            Self::Supabase(sb) => format!("Supabase ({})", sb.url),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Csv(csv) => csv.user_id.as_deref(),
            Self::Supabase(sb) => sb.user_id.as_deref(),
        }
    }

    pub fn build(&self) -> Result<Box<dyn FleetSource>> {
        match self {
            Self::Csv(csv) => Ok(Box::new(
                CsvFleetSource::new(LocalStorage::new(csv.data_dir.clone()))
                    .with_files(csv.airports_file.clone(), csv.aircraft_file.clone())
                    .with_user(csv.user_id.clone()),
            )),
            Self::Supabase(sb) => Ok(Box::new(SupabaseSource::new(sb.clone())?)),
        }
    }
}

fn reject_unresolved_env(field: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(OptimizerError::ConfigValidationError {
            field: field.to_string(),
            message: format!("unresolved environment variable in '{}'", value),
        });
    }
    Ok(())
}

impl Validate for SourceSettings {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Csv(csv) => {
                validate_path("source.data_dir", &csv.data_dir)?;
                validate_path("source.airports_file", &csv.airports_file)?;
                validate_path("source.aircraft_file", &csv.aircraft_file)?;
            }
            Self::Supabase(sb) => {
                reject_unresolved_env("source.url", &sb.url)?;
                validate_url("source.url", &sb.url)?;
                reject_unresolved_env("source.api_key", &sb.api_key)?;
                validate_non_empty_string("source.api_key", &sb.api_key)?;
                validate_range("source.timeout_seconds", sb.timeout_seconds, 1, 600)?;
            }
        }
        Ok(())
    }
}
