//! HTTP client for the OpenRouter-compatible inference API

use super::response::normalize;
use super::{OutboundRequest, ProviderReply, Transport, TransportError};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Sends built requests to the provider, one attempt each
pub struct OpenRouterClient {
    client: Client,
}

impl OpenRouterClient {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Fetch the bytes behind a generated image URL
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        debug!("Downloading generated image from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Provider {
                status: Some(status.as_u16()),
                message: format!("Download failed: {}", status),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Transport for OpenRouterClient {
    async fn send(&self, request: &OutboundRequest) -> Result<ProviderReply, TransportError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::Network(format!("invalid method: {}", e)))?;

        let mut builder = self.client.request(method, &request.endpoint);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let model = &request.body["model"];
        debug!(endpoint = %request.endpoint, model = %model, "Sending request");

        let response = builder.json(&request.body).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", request.endpoint, e);
            TransportError::from(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        let result = normalize(request.kind, status, &body);
        if let Err(e) = &result {
            warn!(status, "Provider call failed: {}", e);
        }
        result
    }
}
