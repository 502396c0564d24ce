use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Service error ({code}): {message}")]
    ServiceError { code: String, message: String },

    #[error("Request throttled: {message}")]
    ThrottlingError { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Service,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI 結束碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EmbedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EmbedError::ApiError(_) => ErrorCategory::Network,
            EmbedError::ServiceError { .. }
            | EmbedError::ThrottlingError { .. }
            | EmbedError::AuthenticationError { .. }
            | EmbedError::DimensionMismatch { .. } => ErrorCategory::Service,
            EmbedError::ConfigError { .. }
            | EmbedError::MissingConfigError { .. }
            | EmbedError::InvalidConfigValueError { .. }
            | EmbedError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EmbedError::ValidationError { .. }
            | EmbedError::CsvError(_)
            | EmbedError::SerializationError(_) => ErrorCategory::Input,
            EmbedError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 稍後重試通常即可恢復
            EmbedError::ThrottlingError { .. } | EmbedError::ApiError(_) => ErrorSeverity::Medium,
            EmbedError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 提供給使用者的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EmbedError::ApiError(_) => {
                "Check network connectivity and the endpoint URL, then retry"
            }
            EmbedError::ServiceError { .. } => {
                "Check the model id and that the model is enabled in this region"
            }
            EmbedError::ThrottlingError { .. } => {
                "Wait and retry, or raise --max-attempts to let the client retry longer"
            }
            EmbedError::AuthenticationError { .. } => {
                "Check AWS credentials (AWS_PROFILE / AWS_BEARER_TOKEN_BEDROCK) \
                 and IAM permissions for bedrock:InvokeModel"
            }
            EmbedError::CsvError(_) | EmbedError::SerializationError(_) => {
                "Check the input file format \
                 (one sentence per line, or JSONL with a \"text\" field)"
            }
            EmbedError::IoError(_) => {
                "Check that the input file exists and the output directory is writable"
            }
            EmbedError::ConfigError { .. }
            | EmbedError::MissingConfigError { .. }
            | EmbedError::InvalidConfigValueError { .. }
            | EmbedError::ConfigValidationError { .. } => {
                "Review the configuration file and command line flags"
            }
            EmbedError::ValidationError { .. } => "Check the input text and request options",
            EmbedError::DimensionMismatch { .. } => {
                "The service returned an unexpected vector length; \
                 check the model id supports the requested dimension"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the embedding service: {}", self),
            ErrorCategory::Service => {
                format!("The embedding service rejected the request: {}", self)
            }
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbedError::ThrottlingError { .. } | EmbedError::ApiError(_)
        ) || matches!(self, EmbedError::ServiceError { code, .. } if code.starts_with('5'))
    }
}

pub type Result<T> = std::result::Result<T, EmbedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_and_severity() {
        let err = EmbedError::ThrottlingError {
            message: "slow down".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Service);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.is_retryable());

        let err = EmbedError::DimensionMismatch {
            expected: 256,
            actual: 1024,
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("expected 256, got 1024"));
    }

    #[test]
    fn test_service_error_5xx_is_retryable() {
        let err = EmbedError::ServiceError {
            code: "503".to_string(),
            message: "unavailable".to_string(),
        };
        assert!(err.is_retryable());

        let err = EmbedError::ServiceError {
            code: "ValidationException".to_string(),
            message: "bad input".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_severity_exit_codes() {
        let throttled = EmbedError::ThrottlingError {
            message: "slow down".to_string(),
        };
        let missing = EmbedError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "sentences.txt",
        ));
        let config = EmbedError::MissingConfigError {
            field: "region".to_string(),
        };

        assert_eq!(throttled.severity().exit_code(), 2);
        assert_eq!(config.severity().exit_code(), 1);
        assert_eq!(missing.severity().exit_code(), 3);
        assert!(missing.severity() > throttled.severity());
    }

    #[test]
    fn test_user_friendly_message() {
        let err = EmbedError::MissingConfigError {
            field: "region".to_string(),
        };
        assert!(err.user_friendly_message().starts_with("Invalid configuration"));
    }
}
