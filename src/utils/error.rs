use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unsupported property archetype: '{archetype}'")]
    UnsupportedArchetype { archetype: String },

    #[error("Property '{property_id}' is missing required field '{field}'")]
    IncompleteProperty { property_id: String, field: String },

    #[error("Invalid holding period: {years} years")]
    InvalidHoldingPeriod { years: f64 },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Investment of {amount:.2} is outside the allowed range {min:.2}..={max:.2}")]
    InvestmentOutOfRange { amount: f64, min: f64, max: f64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

/// 錯誤分類，用於日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Model,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ModelError {
    pub fn invalid_input(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        ModelError::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ModelError::UnsupportedArchetype { .. }
            | ModelError::IncompleteProperty { .. }
            | ModelError::InvalidInput { .. }
            | ModelError::InvestmentOutOfRange { .. } => ErrorCategory::Input,
            ModelError::InvalidHoldingPeriod { .. } => ErrorCategory::Model,
            ModelError::ConfigError { .. } | ModelError::TomlError(_) => {
                ErrorCategory::Configuration
            }
            ModelError::IoError(_)
            | ModelError::SerializationError(_)
            | ModelError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ModelError::InvalidInput { .. }
            | ModelError::InvestmentOutOfRange { .. }
            | ModelError::InvalidHoldingPeriod { .. } => ErrorSeverity::Medium,
            ModelError::UnsupportedArchetype { .. }
            | ModelError::IncompleteProperty { .. }
            | ModelError::ConfigError { .. }
            | ModelError::TomlError(_)
            | ModelError::SerializationError(_) => ErrorSeverity::High,
            ModelError::IoError(_) | ModelError::CsvError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ModelError::UnsupportedArchetype { .. } => {
                "Use one of: single_family, multifamily, business, ground_lease; or flag the listing as a data-quality issue".to_string()
            }
            ModelError::IncompleteProperty { field, .. } => {
                format!("Provide '{}' in the property record; it has no safe default", field)
            }
            ModelError::InvalidHoldingPeriod { .. } => {
                "Holding periods must be positive, finite numbers of years".to_string()
            }
            ModelError::InvalidInput { field, .. } => {
                format!("Check the value of '{}' in the input or assumptions file", field)
            }
            ModelError::InvestmentOutOfRange { .. } => {
                "Adjust the share count to stay within the minimum and maximum investment".to_string()
            }
            ModelError::ConfigError { .. } | ModelError::TomlError(_) => {
                "Check the assumptions file syntax and values".to_string()
            }
            ModelError::SerializationError(_) => {
                "Check that the property file is valid JSON".to_string()
            }
            ModelError::IoError(_) | ModelError::CsvError(_) => {
                "Check file paths and permissions".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Property input rejected: {}", self),
            ErrorCategory::Model => format!("Projection could not be computed: {}", self),
            ErrorCategory::Configuration => format!("Assumptions are invalid: {}", self),
            ErrorCategory::System => format!("File operation failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
