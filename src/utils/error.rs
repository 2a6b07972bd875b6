use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Airport code '{code}' is not in the airport catalog")]
    UnresolvedAirport { code: String },

    #[error("Airport code '{code}' appears more than once in the catalog")]
    DuplicateAirport { code: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Data source returned {status}: {message}")]
    DataSourceError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Geo,
    Network,
    Data,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OptimizerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCoordinate { .. }
            | Self::UnresolvedAirport { .. }
            | Self::DuplicateAirport { .. } => ErrorCategory::Geo,
            Self::ApiError(_) | Self::DataSourceError { .. } => ErrorCategory::Network,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ProcessingError { .. }
            | Self::ValidationError { .. } => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
            Self::ZipError(_) | Self::IoError(_) => ErrorCategory::System,
        }
    }

    /// 單一航段的錯誤可以跳過，網路錯誤值得重試，其餘則中止
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidCoordinate { .. } | Self::UnresolvedAirport { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::DataSourceError { .. } => ErrorSeverity::Medium,
            Self::IoError(_) | Self::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 單筆航段可跳過、不影響整批處理的錯誤
    pub fn is_recoverable(&self) -> bool {
        self.severity() == ErrorSeverity::Low
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidCoordinate { .. } => {
                "Check the airport catalog: latitude must be within [-90, 90] and longitude within [-180, 180]".to_string()
            }
            Self::UnresolvedAirport { code } => {
                format!("Add '{}' to the airport catalog or fix the aircraft's leg codes", code)
            }
            Self::DuplicateAirport { code } => {
                format!("Remove the duplicate '{}' row from the airport catalog", code)
            }
            Self::ApiError(_) => {
                "Check network connectivity and the Supabase URL, then retry".to_string()
            }
            Self::DataSourceError { status, .. } if *status == 401 || *status == 403 => {
                "Check the Supabase API key (SUPABASE_KEY)".to_string()
            }
            Self::DataSourceError { .. } => {
                "Check that the airports and aircraft tables exist and are readable".to_string()
            }
            Self::CsvError(_) => {
                "Check the CSV headers: airports.csv needs icao,name,city,lat,lon".to_string()
            }
            Self::IoError(_) => "Check file paths and write permissions".to_string(),
            Self::ZipError(_) => "Check free disk space in the output directory".to_string(),
            Self::SerializationError(_) => "The data source returned malformed JSON".to_string(),
            Self::ProcessingError { .. } => "Re-run with --verbose to see which leg failed".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Review the configuration file or command line flags".to_string()
            }
            Self::ValidationError { .. } => "Fix the input values and try again".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Geo => format!("Airport data problem: {}", self),
            ErrorCategory::Network => format!("Could not reach the data source: {}", self),
            ErrorCategory::Data => format!("Could not read the fleet data: {}", self),
            ErrorCategory::Config => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 依嚴重程度決定的程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
