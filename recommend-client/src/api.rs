use crate::config::ConfigProvider;
use crate::transport::HttpTransport;
use scriptify_core::{CoreError, LikeFeedback, RecommendationRequest, RecommendationResponse};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

const API_KEY_HEADER: &str = "x-api-key";

/// Client for the recommendation service and its feedback endpoint.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    config: Arc<ConfigProvider>,
    feedback_url: String,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: Arc<ConfigProvider>,
        feedback_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            config,
            feedback_url: feedback_url.into(),
        }
    }

    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, CoreError> {
        let config = self.config.ready().await?;
        let payload = request.payload()?;
        let headers = auth_headers(config.api_key());

        info!(
            "Requesting recommendation for niche '{}' on {}",
            request.niche, request.platform
        );
        debug!("Recommendation payload: {}", payload);

        let start_time = Instant::now();
        let reply = self
            .transport
            .post_json(&config.api_url, &headers, &payload)
            .await?;

        if !reply.is_success() {
            error!(
                "Recommendation request failed with status {} after {:?}",
                reply.status,
                start_time.elapsed()
            );
            return Err(CoreError::http(reply.status, reply.body));
        }

        debug!(
            "Recommendation answered {} in {:?}",
            reply.status,
            start_time.elapsed()
        );

        // Only a body that is not JSON at all falls back to raw text; a JSON
        // body with odd fields is mapped field by field.
        match serde_json::from_str::<Value>(&reply.body) {
            Ok(value) => Ok(RecommendationResponse::from(value)),
            Err(e) => {
                warn!("Recommendation body is not JSON ({}), using raw text", e);
                Ok(RecommendationResponse::from_raw_text(reply.body))
            }
        }
    }

    pub async fn like(&self, feedback: &LikeFeedback) -> Result<Value, CoreError> {
        let config = self.config.ready().await?;
        let body = serde_json::to_value(feedback)?;
        let headers = auth_headers(config.api_key());

        info!("Sending like for idea '{}'", feedback.idea);
        let reply = self
            .transport
            .post_json(&self.feedback_url, &headers, &body)
            .await?;

        if !reply.is_success() {
            error!("Like request failed with status {}", reply.status);
            return Err(CoreError::http(reply.status, reply.body));
        }

        let parsed: Value = serde_json::from_str(&reply.body).map_err(|e| {
            error!("Failed to parse like response: {}", e);
            CoreError::Serialization(e)
        })?;
        Ok(parsed)
    }
}

fn auth_headers(api_key: Option<&str>) -> Vec<(&'static str, &str)> {
    match api_key {
        Some(key) => vec![(API_KEY_HEADER, key)],
        None => Vec::new(),
    }
}
