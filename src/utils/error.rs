use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status}")]
    HttpStatus {
        status: u16,
        request_body: String,
        response_body: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input file not found: {path}")]
    MissingInput { path: String, hint: Option<String> },

    #[error("No common key found for merging (need one of: {})", .candidates.join(", "))]
    NoCommonJoinKey { candidates: Vec<String> },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Input,
    Schema,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatus { .. } => ErrorCategory::Network,
            EtlError::MissingInput { .. } | EtlError::CsvError(_) => ErrorCategory::Input,
            EtlError::NoCommonJoinKey { .. } => ErrorCategory::Schema,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input
            | ErrorCategory::Schema
            | ErrorCategory::Configuration
            | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::HttpStatus { status, .. } => {
                format!("Search API rejected the request (HTTP {})", status)
            }
            EtlError::ApiError(e) => format!("Could not reach the search API: {}", e),
            EtlError::MissingInput { path, .. } => format!("Error: {} not found", path),
            EtlError::NoCommonJoinKey { candidates } => format!(
                "Error: No common key found for merging (need '{}')",
                candidates.join("' or '")
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::HttpStatus { status: 401 | 403, .. } => {
                "Check that CRUNCHBASE_API_KEY holds a valid key".to_string()
            }
            EtlError::HttpStatus { .. } => {
                "Inspect the request and response bodies printed above".to_string()
            }
            EtlError::ApiError(_) => "Check network connectivity and the endpoint URL".to_string(),
            EtlError::MissingInput { hint: Some(hint), .. } => hint.clone(),
            EtlError::MissingInput { .. } => "Check the input file path".to_string(),
            EtlError::NoCommonJoinKey { .. } => {
                "Both CSV files must carry a 'uuid' or 'permalink' column".to_string()
            }
            EtlError::CsvError(_) => {
                "Make sure the input is a UTF-8, comma-delimited CSV".to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Fix the command-line flags or the query config file".to_string()
            }
            EtlError::IoError(_) => "Check file permissions and free disk space".to_string(),
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Re-run with --verbose for more detail".to_string()
            }
        }
    }

    /// 依嚴重程度決定 process exit code
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
