pub mod api;
pub mod config;
pub mod retry;
pub mod transport;

pub use api::ApiClient;
pub use config::{ClientSettings, ConfigProvider, FunnelLink, RetrySettings};
pub use retry::{RetryController, RetryObserver, RetryPolicy, RetryState};
pub use transport::{HttpReply, HttpTransport, ReqwestTransport};

use scriptify_core::CoreError;
use std::sync::Arc;

/// Wires the transport, config provider and API client from the client
/// settings. The config document is fetched lazily on first use.
pub fn connect(settings: &ClientSettings) -> Result<ApiClient, CoreError> {
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(settings.request_timeout())?);
    let config = Arc::new(ConfigProvider::new(
        settings.config_url()?.to_string(),
        transport.clone(),
    ));

    Ok(ApiClient::new(
        transport,
        config,
        settings.feedback_url()?.to_string(),
    ))
}
