use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Non-success response from the recommendation service. The display
    /// form mirrors the service contract: `HTTP <status>: <body>`.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        CoreError::Http {
            status,
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            CoreError::Http { status, .. } => Some(*status),
            CoreError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// A 504 from the gateway means the model behind the service is still
    /// loading.
    pub fn is_cold_start(&self) -> bool {
        self.status_code() == Some(504)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config document from {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Config document request to {url} failed with status {status}")]
    FetchFailed { url: String, status: u16 },

    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
