use async_trait::async_trait;
use reqwest::Client;
use scriptify_core::CoreError;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The only place the client touches the network. Non-success statuses are
/// returned as replies, not errors; only transport failures are `Err`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpReply, CoreError>;

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<HttpReply, CoreError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(concat!("scriptify/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    async fn read(response: reqwest::Response, url: &str) -> Result<HttpReply, CoreError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read response body from {}: {}", url, e);
            CoreError::Network(e)
        })?;
        debug!("{} answered {} ({} bytes)", url, status, body.len());
        Ok(HttpReply { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, CoreError> {
        debug!("GET {}", url);
        let response = self.http_client.get(url).send().await.map_err(|e| {
            error!("Network error for GET {}: {}", url, e);
            CoreError::Network(e)
        })?;
        Self::read(response, url).await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<HttpReply, CoreError> {
        debug!("POST {}", url);
        let mut request_builder = self.http_client.post(url).json(body);
        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let response = request_builder.send().await.map_err(|e| {
            error!("Network error for POST {}: {}", url, e);
            if e.is_timeout() {
                CoreError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                CoreError::Network(e)
            }
        })?;
        Self::read(response, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_success_range() {
        assert!(HttpReply::new(200, "").is_success());
        assert!(HttpReply::new(204, "").is_success());
        assert!(!HttpReply::new(199, "").is_success());
        assert!(!HttpReply::new(504, "").is_success());
    }

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(Duration::from_secs(5));
        assert!(transport.is_ok());
    }
}
