use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
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

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Unusable response from {url}: {message}")]
    ParseFailure { url: String, message: String },

    #[error("Page {url} did not load within {seconds}s")]
    UpstreamTimeout { url: String, seconds: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::HttpError(_) | Self::UpstreamTimeout { .. } => ErrorCategory::Network,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ProcessingError { .. }
            | Self::ParseFailure { .. } => ErrorCategory::Data,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // a bad response body only costs the API path
            Self::ParseFailure { .. } => ErrorSeverity::Low,
            Self::HttpError(_) | Self::UpstreamTimeout { .. } => ErrorSeverity::Medium,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ProcessingError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::UpstreamTimeout { .. } => {
                "The page was too slow; retry later or raise --page-timeout-secs"
            }
            Self::HttpError(_) => "Check network connectivity and the start URL",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
            Self::ParseFailure { .. } => {
                "The API response is ignored; the page scan is used instead"
            }
            Self::IoError(_) => "Check that the output path is writable",
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                "Re-run with --verbose and inspect the diagnostic record"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::UpstreamTimeout { url, seconds } => {
                format!("Timed out after {}s while loading {}", seconds, url)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable_network_error() {
        let err = ScrapeError::UpstreamTimeout {
            url: "https://example.com".to_string(),
            seconds: 60,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
        assert!(err.user_friendly_message().contains("60s"));
    }

    #[test]
    fn test_parse_failure_is_low_severity() {
        let err = ScrapeError::ParseFailure {
            url: "https://api.example.com/departures".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(!err.is_retryable());
    }
}
