use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Catalog error in {file} line {line}: {message}")]
    CatalogError {
        file: String,
        line: u64,
        message: String,
    },

    #[error("Requirements lookup error: {message}")]
    LookupError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
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

impl AssistantError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AssistantError::HttpError(_) | AssistantError::LookupError { .. } => {
                ErrorCategory::Network
            }
            AssistantError::CsvError(_)
            | AssistantError::SerializationError(_)
            | AssistantError::CatalogError { .. }
            | AssistantError::ValidationError { .. } => ErrorCategory::Data,
            AssistantError::IoError(_) => ErrorCategory::Io,
            AssistantError::ConfigError { .. }
            | AssistantError::InvalidConfigValueError { .. }
            | AssistantError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // lookups always have an offline fallback
            AssistantError::LookupError { .. } | AssistantError::ValidationError { .. } => {
                ErrorSeverity::Low
            }
            AssistantError::HttpError(_) => ErrorSeverity::Medium,
            AssistantError::CsvError(_)
            | AssistantError::SerializationError(_)
            | AssistantError::CatalogError { .. } => ErrorSeverity::High,
            AssistantError::IoError(_)
            | AssistantError::ConfigError { .. }
            | AssistantError::InvalidConfigValueError { .. }
            | AssistantError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AssistantError::HttpError(_) | AssistantError::LookupError { .. } => {
                "Check network access or set lookup.allow_web = false".to_string()
            }
            AssistantError::CsvError(_) | AssistantError::CatalogError { .. } => {
                "Fix the reported row in the catalog CSV and restart".to_string()
            }
            AssistantError::SerializationError(_) => {
                "Delete or repair the requirements cache file".to_string()
            }
            AssistantError::ValidationError { .. } => {
                "Rephrase the request and try again".to_string()
            }
            AssistantError::IoError(_) => {
                "Make sure the data files exist and are readable (see --data-dir)".to_string()
            }
            AssistantError::ConfigError { .. }
            | AssistantError::InvalidConfigValueError { .. }
            | AssistantError::MissingConfigError { .. } => {
                "Review the TOML configuration file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AssistantError::CatalogError { file, line, .. } => {
                format!("The parts catalog '{}' has a bad row at line {}", file, line)
            }
            AssistantError::IoError(e) => format!("Could not read a data file: {}", e),
            AssistantError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            AssistantError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_and_category() {
        let err = AssistantError::CatalogError {
            file: "parts.csv".to_string(),
            line: 7,
            message: "bad price".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("line 7"));

        let lookup = AssistantError::LookupError {
            message: "steam down".to_string(),
        };
        assert_eq!(lookup.severity(), ErrorSeverity::Low);
    }
}
