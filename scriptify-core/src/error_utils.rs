use crate::error::*;
use std::time::Duration;
use tracing::{error, info, warn};

/// Fixed wait before retrying a request that hit a cold model.
pub const COLD_START_RETRY_DELAY: Duration = Duration::from_secs(5);

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            CoreError::Network(e) => {
                error!("Network error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        match self {
            CoreError::Config(e) => {
                e.log_warn();
            }
            _ => warn!("CoreError (warning): {}", self),
        }
        self
    }

    fn is_retryable(&self) -> bool {
        // Only the cold-start gateway timeout is worth a second attempt;
        // everything else is surfaced straight away.
        self.is_cold_start()
    }

    fn retry_after(&self) -> Option<Duration> {
        if self.is_retryable() {
            Some(COLD_START_RETRY_DELAY)
        } else {
            None
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Http { status: 504, .. } => {
                "The recommendation model is still warming up. Please try again shortly."
                    .to_string()
            }
            CoreError::Http { status: 401, .. } | CoreError::Http { status: 403, .. } => {
                "The recommendation service rejected the API key.".to_string()
            }
            CoreError::Http { status, .. } => {
                format!("The recommendation service answered with status {}.", status)
            }
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            CoreError::Timeout { .. } => {
                "The operation took too long to complete. Please try again.".to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Http { .. } => "HTTP".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Timeout { .. } => "TIMEOUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::Unreachable { url, .. } | ConfigError::FetchFailed { url, .. } => {
                format!("Could not read the service configuration from {}.", url)
            }
            ConfigError::InvalidFormat { .. } => {
                "Configuration format is invalid. Please check the settings.".to_string()
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Settings file could not be parsed. Please check the syntax.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::Unreachable { .. } => "CONFIG_UNREACHABLE".to_string(),
            ConfigError::FetchFailed { .. } => "CONFIG_FETCH_FAILED".to_string(),
            ConfigError::InvalidFormat { .. } => "CONFIG_INVALID_FORMAT".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs failures with their code and the message shown to the user.
/// Errors that end a request go through `report_error`; failures the app
/// shrugs off, such as a lost like, go through `report_warning`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
        if let Some(retry_after) = error.retry_after() {
            info!("Error is retryable. Retry after: {:?}", retry_after);
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        error.log_warn();
        info!("Error code: {}", error.error_code());
    }
}
