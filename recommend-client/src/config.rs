use crate::transport::HttpTransport;
use scriptify_core::{Config, ConfigError, CoreError, DEFAULT_FALLBACK_DELAY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

const CONFIG_PATH: &str = "/config.json";
const FEEDBACK_PATH: &str = "/api/feedback/like";

/// Settings of the desktop client itself, read from `scriptify.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Site that serves `/config.json` and the feedback endpoint.
    pub origin: String,
    pub request_timeout_secs: u64,
    pub fallback_delay_ms: u64,
    pub retry: RetrySettings,
    pub funnel: Vec<FunnelLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelLink {
    pub label: String,
    pub base: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            request_timeout_secs: 120,
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY.as_millis() as u64,
            retry: RetrySettings::default(),
            funnel: Vec::new(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay_ms: 5000,
        }
    }
}

impl ClientSettings {
    /// Reads settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let settings = Self::from_toml(&raw)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Self, CoreError> {
        let settings: Self = toml::from_str(raw).map_err(ConfigError::from)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.origin_url()?;
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin).map_err(|e| ConfigError::InvalidValue {
            field: "origin".to_string(),
            value: format!("{} ({})", self.origin, e),
        })
    }

    pub fn config_url(&self) -> Result<Url, ConfigError> {
        self.join(CONFIG_PATH)
    }

    pub fn feedback_url(&self) -> Result<Url, ConfigError> {
        self.join(FEEDBACK_PATH)
    }

    fn join(&self, path: &str) -> Result<Url, ConfigError> {
        self.origin_url()?
            .join(path)
            .map_err(|e| ConfigError::InvalidValue {
                field: "origin".to_string(),
                value: format!("{} ({})", self.origin, e),
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }
}

/// Loads the service config document once and hands out the cached copy.
///
/// Callers that arrive while the first fetch is still running wait for that
/// fetch instead of starting their own. A failed fetch is not cached, so the
/// next call tries again.
pub struct ConfigProvider {
    source: Option<ConfigSource>,
    cell: OnceCell<Config>,
}

struct ConfigSource {
    url: String,
    transport: Arc<dyn HttpTransport>,
}

impl ConfigProvider {
    pub fn new(url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            source: Some(ConfigSource {
                url: url.into(),
                transport,
            }),
            cell: OnceCell::new(),
        }
    }

    /// A provider that never touches the network.
    pub fn with_config(config: Config) -> Self {
        Self {
            source: None,
            cell: OnceCell::new_with(Some(config)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn ready(&self) -> Result<&Config, ConfigError> {
        self.cell.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<Config, ConfigError> {
        let source = self.source.as_ref().ok_or_else(|| ConfigError::MissingField {
            field: "API_URL".to_string(),
        })?;

        debug!("Fetching config document from {}", source.url);
        let reply = source
            .transport
            .get(&source.url)
            .await
            .map_err(|e| ConfigError::Unreachable {
                url: source.url.clone(),
                reason: e.to_string(),
            })?;

        if !reply.is_success() {
            warn!("Config fetch from {} returned {}", source.url, reply.status);
            return Err(ConfigError::FetchFailed {
                url: source.url.clone(),
                status: reply.status,
            });
        }

        let config: Config =
            serde_json::from_str(&reply.body).map_err(|e| ConfigError::InvalidFormat {
                details: e.to_string(),
            })?;

        if config.api_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "API_URL".to_string(),
            });
        }

        info!(
            "Loaded service config (api_url: {}, api key: {})",
            config.api_url,
            if config.api_key().is_some() { "set" } else { "none" }
        );
        Ok(config)
    }
}
