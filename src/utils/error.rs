use std::fmt;
use thiserror::Error;

/// Which kind of input line a parse error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Product,
    Service,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Product => write!(f, "product"),
            RecordKind::Service => write!(f, "service"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LandedCostError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid {kind} record at line {line}, field '{field}': {message}")]
    ParseError {
        kind: RecordKind,
        line: u64,
        field: String,
        message: String,
    },

    #[error("Input is incomplete: {what}")]
    EmptyInput { what: String },

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LandedCostError {
    pub fn parse(kind: RecordKind, line: u64, field: &str, message: impl Into<String>) -> Self {
        LandedCostError::ParseError {
            kind,
            line,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LandedCostError::ParseError { .. } | LandedCostError::EmptyInput { .. } => {
                ErrorCategory::Input
            }
            LandedCostError::ConfigValidationError { .. }
            | LandedCostError::InvalidConfigValueError { .. }
            | LandedCostError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LandedCostError::ZipError(_)
            | LandedCostError::CsvError(_)
            | LandedCostError::SerializationError(_) => ErrorCategory::Output,
            LandedCostError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LandedCostError::ParseError { kind, line, .. } => format!(
                "Fix line {} of the {} file; expected four comma-separated fields",
                line, kind
            ),
            LandedCostError::EmptyInput { .. } => {
                "Provide at least one product line before running the allocation".to_string()
            }
            LandedCostError::ConfigValidationError { field, .. }
            | LandedCostError::InvalidConfigValueError { field, .. }
            | LandedCostError::MissingConfigError { field } => {
                format!("Check the '{}' setting in your configuration", field)
            }
            LandedCostError::IoError(_) => {
                "Check that the input files exist and the output directory is writable"
                    .to_string()
            }
            LandedCostError::ZipError(_)
            | LandedCostError::CsvError(_)
            | LandedCostError::SerializationError(_) => {
                "Retry the run; if it keeps failing, disable compression or change the output formats"
                    .to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The input data could not be used. {}", self),
            ErrorCategory::Configuration => format!("The configuration is invalid. {}", self),
            ErrorCategory::Output => format!("The report could not be written. {}", self),
            ErrorCategory::System => format!("A system error occurred. {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, LandedCostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_names_line_and_field() {
        let err = LandedCostError::parse(RecordKind::Service, 3, "cost", "not a number");
        assert_eq!(
            err.to_string(),
            "Invalid service record at line 3, field 'cost': not a number"
        );
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = LandedCostError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("A system error occurred."));
    }
}
