use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    ExcelError(#[from] calamine::Error),

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

    #[error("Unsupported file format '{extension}' for {path}")]
    UnsupportedFormat { path: String, extension: String },

    #[error("{file}: no {role} column found (looked for: {candidates})")]
    MissingColumn {
        file: String,
        role: String,
        candidates: String,
    },

    #[error("{file}: row {row}, column '{column}': cannot parse '{value}' ({reason})")]
    InvalidValue {
        file: String,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Data,
    Model,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ReconError {
    pub fn processing(message: impl Into<String>) -> Self {
        ReconError::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReconError::ConfigValidationError { .. }
            | ReconError::InvalidConfigValueError { .. }
            | ReconError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReconError::CsvError(_)
            | ReconError::ExcelError(_)
            | ReconError::UnsupportedFormat { .. } => ErrorCategory::Input,
            ReconError::MissingColumn { .. } | ReconError::InvalidValue { .. } => {
                ErrorCategory::Data
            }
            ReconError::InsufficientData { .. } | ReconError::ProcessingError { .. } => {
                ErrorCategory::Model
            }
            ReconError::IoError(_) | ReconError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Model => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReconError::CsvError(_) => {
                "Check that both files are well-formed delimited text with a header row".to_string()
            }
            ReconError::ExcelError(_) => {
                "Check that the workbook opens in a spreadsheet application and its first sheet has a header row"
                    .to_string()
            }
            ReconError::IoError(_) => {
                "Check that the input files exist and the output directory is writable".to_string()
            }
            ReconError::SerializationError(_) => "Re-run with --verbose for details".to_string(),
            ReconError::ConfigValidationError { field, .. }
            | ReconError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in the CLI arguments or TOML file", field)
            }
            ReconError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            ReconError::UnsupportedFormat { .. } => {
                "Use .csv (comma), .txt (pipe-delimited), .xlsx or .xls input".to_string()
            }
            ReconError::MissingColumn { role, .. } => format!(
                "Rename a header to contain one of the {} aliases, or add an alias under [columns] in the config",
                role
            ),
            ReconError::InvalidValue { column, .. } => {
                format!("Clean up the values in column '{}'", column)
            }
            ReconError::InsufficientData { .. } => {
                "Provide more rows so that both training and test partitions are non-empty"
                    .to_string()
            }
            ReconError::ProcessingError { .. } => "Re-run with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Data => format!("Bad input data: {}", self),
            ErrorCategory::Model => format!("Matching failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = ReconError::MissingColumn {
            file: "a.csv".to_string(),
            role: "amount".to_string(),
            candidates: "amount, amt".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = ReconError::InsufficientData {
            message: "1 pair".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = ReconError::IoError(std::io::Error::other("disk"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_every_error_exits_non_zero() {
        // Medium is the lowest severity, so no failure maps to exit code 0.
        let errors = [
            ReconError::InsufficientData {
                message: "0 pairs".to_string(),
            },
            ReconError::processing("forest"),
            ReconError::MissingConfigError {
                field: "expected_file".to_string(),
            },
        ];
        for err in errors {
            assert!(err.severity() >= ErrorSeverity::Medium);
        }
    }

    #[test]
    fn test_workbook_errors_are_input_errors() {
        let err = ReconError::from(calamine::Error::Msg("no sheets"));
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_user_friendly_message_contains_detail() {
        let err = ReconError::UnsupportedFormat {
            path: "book.ods".to_string(),
            extension: "ods".to_string(),
        };
        let msg = err.user_friendly_message();
        assert!(msg.contains("book.ods"));
        assert!(err.recovery_suggestion().contains(".csv"));
    }
}
