//! Provider API layer: request construction, transport and response normalization

mod client;
mod request;
mod response;

pub use client::{OpenRouterClient, DEFAULT_TIMEOUT_SECS};
pub use request::{
    code_system_prompt, GenerationInput, Message, OutboundRequest, RequestBuilder,
    RequestOptions, ResponseKind, Role,
};
pub use response::{normalize, ProviderReply, TokenUsage};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, DNS, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {message}")]
    Provider { status: Option<u16>, message: String },

    /// Success status but the body lacks the expected fields
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Text shown to the user next to the failed action
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Network(_) => "Failed to reach the provider. Please try again.".to_string(),
            TransportError::Provider { message, .. } => message.clone(),
            TransportError::Malformed(_) => "Unexpected response from provider".to_string(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Network(format!("request timed out: {}", e))
        } else if e.is_decode() {
            TransportError::Malformed(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// Executes outbound requests against the provider
#[async_trait]
pub trait Transport: Send + Sync {
    /// Single attempt, no retry
    async fn send(&self, request: &OutboundRequest) -> Result<ProviderReply, TransportError>;
}
