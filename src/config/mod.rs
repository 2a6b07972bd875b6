pub mod source;
pub mod toml_config;

pub use source::{CsvSourceConfig, SourceSettings};

#[cfg(feature = "cli")]
pub use cli::{CliConfig, SourceKind};

#[cfg(feature = "cli")]
mod cli {
    use super::source::{CsvSourceConfig, SourceSettings};
    use crate::adapters::SupabaseConfig;
    use crate::core::detour::DEFAULT_DETOUR_THRESHOLD_KM;
    use crate::core::report::DEFAULT_DISPLAY_LIMIT;
    use crate::domain::ports::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_output_formats, validate_path, validate_positive_float, validate_required_field,
        Validate,
    };
    use clap::{Parser, ValueEnum};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
    pub enum SourceKind {
        Csv,
        Supabase,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "empty-leg-optimizer")]
    #[command(about = "Find detour airports along each aircraft's next empty leg")]
    pub struct CliConfig {
        #[arg(long, value_enum, default_value = "csv")]
        pub source: SourceKind,

        #[arg(long, default_value = "./data", help = "Directory holding airports.csv and aircraft.csv")]
        pub data_dir: String,

        #[arg(long, default_value = "airports.csv")]
        pub airports_file: String,

        #[arg(long, default_value = "aircraft.csv")]
        pub aircraft_file: String,

        #[arg(long, env = "SUPABASE_URL")]
        pub supabase_url: Option<String>,

        #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
        pub supabase_key: Option<String>,

        #[arg(long, env = "SUPABASE_ACCESS_TOKEN", hide_env_values = true)]
        pub access_token: Option<String>,

        #[arg(long, help = "Only list aircraft owned by this user id")]
        pub user_id: Option<String>,

        #[arg(long, default_value = "30")]
        pub timeout_seconds: u64,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "csv,json")]
        pub output_formats: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_DETOUR_THRESHOLD_KM)]
        pub detour_threshold_km: f64,

        #[arg(long, default_value_t = DEFAULT_DISPLAY_LIMIT, help = "Detour codes shown per leg (0 = all)")]
        pub display_limit: usize,

        #[arg(long, help = "Bundle all outputs into one ZIP file")]
        pub zip: bool,

        #[arg(long, default_value = "matches.zip")]
        pub zip_name: String,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log as JSON lines")]
        pub log_json: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,
    }

    impl CliConfig {
        pub fn source_settings(&self) -> Result<SourceSettings> {
            match self.source {
                SourceKind::Csv => Ok(SourceSettings::Csv(CsvSourceConfig {
                    data_dir: self.data_dir.clone(),
                    airports_file: self.airports_file.clone(),
                    aircraft_file: self.aircraft_file.clone(),
                    user_id: self.user_id.clone(),
                })),
                SourceKind::Supabase => {
                    let url = validate_required_field("supabase_url", &self.supabase_url)?;
                    let key = validate_required_field("supabase_key", &self.supabase_key)?;
                    let mut config = SupabaseConfig::new(url.clone(), key.clone());
                    config.access_token = self.access_token.clone();
                    config.user_id = self.user_id.clone();
                    config.timeout_seconds = self.timeout_seconds;
                    Ok(SourceSettings::Supabase(config))
                }
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn detour_threshold_km(&self) -> f64 {
            self.detour_threshold_km
        }

        fn display_limit(&self) -> usize {
            self.display_limit
        }

        fn bundle_name(&self) -> Option<&str> {
            self.zip.then_some(self.zip_name.as_str())
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            self.source_settings()?.validate()?;
            validate_path("output_path", &self.output_path)?;
            validate_output_formats("output_formats", &self.output_formats)?;
            validate_positive_float("detour_threshold_km", self.detour_threshold_km)?;
            if self.zip {
                validate_path("zip_name", &self.zip_name)?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = CliConfig::parse_from(["empty-leg-optimizer"]);
            assert_eq!(config.source, SourceKind::Csv);
            assert_eq!(config.detour_threshold_km, 300.0);
            assert_eq!(config.display_limit, 3);
            assert_eq!(config.output_formats, vec!["csv", "json"]);
            assert_eq!(config.bundle_name(), None);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_supabase_requires_url_and_key() {
            let config = CliConfig::parse_from([
                "empty-leg-optimizer",
                "--source",
                "supabase",
                "--supabase-url",
                "https://abc.supabase.co",
            ]);
            // SUPABASE_KEY 可能存在於環境中，只在未設定時檢查
            if config.supabase_key.is_none() {
                assert!(config.validate().is_err());
            }

            let config = CliConfig::parse_from([
                "empty-leg-optimizer",
                "--source",
                "supabase",
                "--supabase-url",
                "https://abc.supabase.co",
                "--supabase-key",
                "anon",
                "--user-id",
                "user-42",
            ]);
            match config.source_settings().unwrap() {
                SourceSettings::Supabase(sb) => {
                    assert_eq!(sb.api_key, "anon");
                    assert_eq!(sb.user_id.as_deref(), Some("user-42"));
                }
                other => panic!("expected supabase settings, got {:?}", other),
            }
        }

        #[test]
        fn test_rejects_bad_threshold_and_format() {
            let config = CliConfig::parse_from(["empty-leg-optimizer", "--detour-threshold-km", "0"]);
            assert!(config.validate().is_err());

            let config = CliConfig::parse_from(["empty-leg-optimizer", "--output-formats", "csv,xlsx"]);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_zip_bundle_name() {
            let config = CliConfig::parse_from(["empty-leg-optimizer", "--zip"]);
            assert_eq!(config.bundle_name(), Some("matches.zip"));
        }
    }
}
