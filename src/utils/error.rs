use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Invalid item '{name}': {reason}")]
    InvalidItem { name: String, reason: String },

    #[error("Invalid budget: {value} (must be zero or positive)")]
    InvalidBudget { value: String },

    #[error("Inconsistent search state: {message}")]
    InconsistentState { message: String },

    #[error("Insufficient timing data: {valid} valid samples, at least {required} required")]
    InsufficientData { valid: usize, required: usize },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Decimal conversion error: {0}")]
    DecimalError(#[from] rust_decimal::Error),

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

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Engine,
    Analysis,
    Io,
    Configuration,
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
            OptimizerError::InvalidItem { .. }
            | OptimizerError::InvalidBudget { .. }
            | OptimizerError::CsvError(_)
            | OptimizerError::DecimalError(_) => ErrorCategory::Input,
            OptimizerError::InconsistentState { .. } | OptimizerError::ProcessingError { .. } => {
                ErrorCategory::Engine
            }
            OptimizerError::InsufficientData { .. } => ErrorCategory::Analysis,
            OptimizerError::IoError(_)
            | OptimizerError::SerializationError(_)
            | OptimizerError::ZipError(_) => ErrorCategory::Io,
            OptimizerError::ConfigError { .. }
            | OptimizerError::ConfigValidationError { .. }
            | OptimizerError::InvalidConfigValueError { .. }
            | OptimizerError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OptimizerError::InsufficientData { .. } => ErrorSeverity::Medium,
            OptimizerError::InconsistentState { .. } => ErrorSeverity::Critical,
            OptimizerError::IoError(_) | OptimizerError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            OptimizerError::InvalidItem { .. } => {
                "Clean the catalogue first: drop rows with a non-positive price or profit and make names unique".to_string()
            }
            OptimizerError::InvalidBudget { .. } => "Pass a budget of zero or more".to_string(),
            OptimizerError::InconsistentState { .. } => {
                "This is an engine defect; rerun with --verbose and report the catalogue that triggered it".to_string()
            }
            OptimizerError::InsufficientData { .. } => {
                "Widen the size schedule or raise the timing ceiling so more samples are collected".to_string()
            }
            OptimizerError::CsvError(_) | OptimizerError::DecimalError(_) => {
                "Check that the catalogue has name,price,profit columns with decimal values".to_string()
            }
            OptimizerError::IoError(_) | OptimizerError::ZipError(_) => {
                "Check file paths and permissions".to_string()
            }
            OptimizerError::SerializationError(_) => "Check the report contents".to_string(),
            OptimizerError::ConfigError { .. }
            | OptimizerError::ConfigValidationError { .. }
            | OptimizerError::InvalidConfigValueError { .. }
            | OptimizerError::MissingConfigError { .. } => {
                "Fix the configuration value and try again".to_string()
            }
            OptimizerError::ProcessingError { .. } => "Retry the run".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The catalogue or budget is not usable: {}", self),
            ErrorCategory::Engine => format!("The search failed: {}", self),
            ErrorCategory::Analysis => format!("The complexity analysis failed: {}", self),
            ErrorCategory::Io => format!("Could not read or write files: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
