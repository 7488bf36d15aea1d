use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// 錯誤分類，用於日誌與統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Validation,
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapperError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapperError::ZipError(_) | MapperError::IoError(_) => ErrorCategory::Io,
            MapperError::CsvError(_)
            | MapperError::SerializationError(_)
            | MapperError::ProcessingError { .. } => ErrorCategory::Data,
            MapperError::ConfigValidationError { .. }
            | MapperError::InvalidConfigValueError { .. }
            | MapperError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MapperError::ValidationError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 對照失敗只影響部分交易，其餘輸出仍然有效
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MapperError::ZipError(_) | MapperError::IoError(_) => {
                "Check that the input file exists and the output directory is writable"
            }
            MapperError::CsvError(_) => "Check line item values for characters the CSV writer rejects",
            MapperError::SerializationError(_) => {
                "Make sure the input file contains valid JSON transaction documents"
            }
            MapperError::ConfigValidationError { .. }
            | MapperError::InvalidConfigValueError { .. }
            | MapperError::MissingConfigError { .. } => {
                "Review the mapping TOML file or command line arguments"
            }
            MapperError::ProcessingError { .. } => "Inspect the input documents with --list-paths",
            MapperError::ValidationError { .. } => {
                "Select a source field or set a user defined value for the reported fields"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MapperError::IoError(e) => format!("Unable to read or write a file: {}", e),
            MapperError::SerializationError(e) => format!("The transaction JSON is malformed: {}", e),
            MapperError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            MapperError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            MapperError::ValidationError { message } => {
                format!("Mapping validation failed: {}", message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = MapperError::ValidationError {
            message: "Email: No source field selected".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::Low);

        let err = MapperError::MissingConfigError {
            field: "load.output_path".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = MapperError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_user_friendly_message_names_field() {
        let err = MapperError::InvalidConfigValueError {
            field: "load.output_formats".to_string(),
            value: "xml".to_string(),
            reason: "Unsupported format".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Configuration field 'load.output_formats' is invalid: Unsupported format"
        );
    }
}
