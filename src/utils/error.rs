use thiserror::Error;

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Model API returned {status}: {body}")]
    ModelApiError { status: u16, body: String },

    #[error("Model {model} returned no content")]
    EmptyResponseError { model: String },

    #[error("Generation failed for every requested artifact ({failed} attempted)")]
    GenerationFailedError { failed: usize },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Model,
    Storage,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl DraftError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DraftError::MissingConfigError { .. }
            | DraftError::InvalidConfigValueError { .. }
            | DraftError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            DraftError::HttpError(_) => ErrorCategory::Network,
            DraftError::ModelApiError { .. }
            | DraftError::EmptyResponseError { .. }
            | DraftError::GenerationFailedError { .. }
            | DraftError::SerializationError(_) => ErrorCategory::Model,
            DraftError::ZipError(_) | DraftError::IoError(_) => ErrorCategory::Storage,
            DraftError::ValidationError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DraftError::HttpError(_)
            | DraftError::ModelApiError { .. }
            | DraftError::EmptyResponseError { .. }
            | DraftError::GenerationFailedError { .. } => ErrorSeverity::Medium,
            DraftError::ValidationError { .. }
            | DraftError::SerializationError(_)
            | DraftError::ZipError(_)
            | DraftError::IoError(_) => ErrorSeverity::High,
            DraftError::MissingConfigError { .. }
            | DraftError::InvalidConfigValueError { .. }
            | DraftError::ConfigValidationError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Process exit status for a failed run, never 0.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    /// Short message for the terminal; details stay in the log.
    pub fn user_friendly_message(&self) -> String {
        match self {
            DraftError::MissingConfigError { field } => {
                format!("Missing required setting `{}`", field)
            }
            DraftError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting `{}`: {}", field, reason)
            }
            DraftError::ConfigValidationError { field, message } => {
                format!("Could not load configuration ({}): {}", field, message)
            }
            DraftError::HttpError(_)
            | DraftError::ModelApiError { .. }
            | DraftError::EmptyResponseError { .. }
            | DraftError::GenerationFailedError { .. }
            | DraftError::SerializationError(_) => {
                "Error generating configuration. The model API call failed.".to_string()
            }
            DraftError::ZipError(_) => "Could not build the bundle archive".to_string(),
            DraftError::IoError(e) => format!("File operation failed: {}", e),
            DraftError::ValidationError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DraftError::MissingConfigError { field } if field == "OPENAI_API_KEY" => {
                "Create a `.env` file and add `OPENAI_API_KEY=<YOUR_API_KEY>`".to_string()
            }
            DraftError::MissingConfigError { field } => {
                format!("Set `{}` in the config file or environment", field)
            }
            DraftError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of `{}` and try again", field)
            }
            DraftError::ConfigValidationError { .. } => {
                "Check that the config file exists and is valid TOML".to_string()
            }
            DraftError::HttpError(_) => {
                "Check network connectivity and the model base URL".to_string()
            }
            DraftError::ModelApiError { status, .. } if *status == 401 || *status == 403 => {
                "Check that the API key is valid".to_string()
            }
            DraftError::ModelApiError { status, .. } if *status == 429 => {
                "Rate limited by the model API, wait and run again".to_string()
            }
            DraftError::ModelApiError { .. }
            | DraftError::EmptyResponseError { .. }
            | DraftError::GenerationFailedError { .. }
            | DraftError::SerializationError(_) => {
                "Run again, or check the model name in the config".to_string()
            }
            DraftError::ZipError(_) => "Check that the output directory is writable".to_string(),
            DraftError::IoError(_) => {
                "Check that the input files exist and the output directory is writable".to_string()
            }
            DraftError::ValidationError { .. } => "Run with --help for usage".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_critical_configuration_error() {
        let err = DraftError::MissingConfigError {
            field: "OPENAI_API_KEY".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains(".env"));
    }

    #[test]
    fn test_model_failures_share_generic_message() {
        let api = DraftError::ModelApiError {
            status: 500,
            body: "upstream exploded".to_string(),
        };
        let empty = DraftError::EmptyResponseError {
            model: "gpt-4o".to_string(),
        };
        assert_eq!(api.user_friendly_message(), empty.user_friendly_message());
        assert!(!api.user_friendly_message().contains("upstream"));
    }

    #[test]
    fn test_auth_failure_suggests_key_check() {
        let err = DraftError::ModelApiError {
            status: 401,
            body: String::new(),
        };
        assert!(err.recovery_suggestion().contains("API key"));
    }

    #[test]
    fn test_model_failures_never_exit_successfully() {
        let failures = [
            DraftError::ModelApiError {
                status: 500,
                body: String::new(),
            },
            DraftError::EmptyResponseError {
                model: "gpt-4o".to_string(),
            },
            DraftError::GenerationFailedError { failed: 6 },
        ];
        for err in &failures {
            assert_eq!(err.category(), ErrorCategory::Model);
            assert!(err.severity() >= ErrorSeverity::Medium, "{:?}", err);
            assert_ne!(err.exit_code(), 0, "{:?}", err);
        }
    }

    #[test]
    fn test_read_failure_is_not_reported_as_write_failure() {
        let err = DraftError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "main.tf not found",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.user_friendly_message().contains("main.tf not found"));
        assert!(!err.user_friendly_message().contains("write"));
        assert!(err.recovery_suggestion().contains("input files exist"));
    }
}
