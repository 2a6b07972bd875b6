use crate::config::source::SourceSettings;
use crate::core::detour::DetourConfig;
use crate::core::report::DEFAULT_DISPLAY_LIMIT;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OptimizerError, Result};
use crate::utils::validation::{validate_output_formats, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceSettings,
    #[serde(default)]
    pub detour: DetourConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    pub compression: Option<CompressionConfig>,
}

fn default_display_limit() -> usize {
    DEFAULT_DISPLAY_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    #[serde(default = "default_bundle_name")]
    pub filename: String,
}

fn default_bundle_name() -> String {
    "matches.zip".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OptimizerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_KEY})；未設定的保留原樣，交由驗證回報
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            OptimizerError::ConfigError {
                message: format!("Invalid env var pattern: {}", e),
            }
        })?;

        let replaced = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });
        Ok(replaced.into_owned())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn detour_threshold_km(&self) -> f64 {
        self.detour.detour_threshold_km
    }

    fn display_limit(&self) -> usize {
        self.load.display_limit
    }

    fn bundle_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.detour.validate()?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_output_formats("load.output_formats", &self.load.output_formats)?;
        if let Some(name) = self.bundle_name() {
            validate_path("load.compression.filename", name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_supabase_config() {
        let toml_content = r#"
[source]
type = "supabase"
url = "https://abc.supabase.co"
api_key = "anon-key"
user_id = "user-42"

[detour]
detour_threshold_km = 250.0

[load]
output_path = "./test-output"
output_formats = ["csv", "json"]
display_limit = 5

[load.compression]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.source.kind(), "supabase");
        assert_eq!(config.source.user_id(), Some("user-42"));
        assert_eq!(config.detour_threshold_km(), 250.0);
        assert_eq!(config.display_limit(), 5);
        assert_eq!(config.bundle_name(), Some("matches.zip"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_csv_source() {
        let toml_content = r#"
[source]
type = "csv"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.source.kind(), "csv");
        assert_eq!(config.detour_threshold_km(), 300.0);
        assert_eq!(config.display_limit(), 3);
        assert_eq!(config.bundle_name(), None);
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ELO_TEST_SUPABASE_KEY", "secret-from-env");

        let toml_content = r#"
[source]
type = "supabase"
url = "https://abc.supabase.co"
api_key = "${ELO_TEST_SUPABASE_KEY}"

[load]
output_path = "./output"
output_formats = ["json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        match &config.source {
            SourceSettings::Supabase(sb) => assert_eq!(sb.api_key, "secret-from-env"),
            other => panic!("expected supabase source, got {:?}", other),
        }

        std::env::remove_var("ELO_TEST_SUPABASE_KEY");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[source]
type = "supabase"
url = "https://abc.supabase.co"
api_key = "${ELO_TEST_DEFINITELY_UNSET}"

[load]
output_path = "./output"
output_formats = ["json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[source]
type = "csv"

[detour]
detour_threshold_km = -10.0

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_source_type_is_parse_error() {
        let toml_content = r#"
[source]
type = "ftp"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(OptimizerError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[source]
type = "csv"
data_dir = "./fleet"

[load]
output_path = "./output"
output_formats = ["csv", "tsv"]

[monitoring]
enabled = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(config.monitoring_enabled());
        assert_eq!(config.source.describe(), "CSV (./fleet/airports.csv, ./fleet/aircraft.csv)");
    }
}
