//! Outbound request construction for the inference provider

use crate::credential::Credential;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A message in the chat-completions wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Response body shape the provider is expected to answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// `{choices: [{message: {content}}]}`
    ChatCompletion,
    /// `{data: [{url}]}`
    ImageGeneration,
}

/// User input for one generation, tagged by capability
#[derive(Debug, Clone, Copy)]
pub enum GenerationInput<'a> {
    Chat {
        /// Earlier turns to replay; empty when history is not sent
        history: &'a [Message],
        input: &'a str,
    },
    Code {
        language: &'a str,
        input: &'a str,
    },
    Image {
        prompt: &'a str,
    },
}

/// Transport-ready HTTP request
#[derive(Clone, PartialEq)]
pub struct OutboundRequest {
    pub endpoint: String,
    pub method: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: Value,
    pub kind: ResponseKind,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "Bearer ***")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("OutboundRequest")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("headers", &headers)
            .field("body", &self.body)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Settings that shape every outbound request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// API root, e.g. `https://openrouter.ai/api/v1`
    pub base_url: String,
    /// Sent as `HTTP-Referer` to identify the client
    pub referer: String,
    /// Sent as `X-Title`
    pub title: String,
    pub image_size: String,
    pub image_count: u32,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            referer: "https://github.com/model-studio".to_string(),
            title: "AI Multi-Model App".to_string(),
            image_size: "1024x1024".to_string(),
            image_count: 1,
        }
    }
}

/// Builds provider requests for each capability
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    options: RequestOptions,
}

impl RequestBuilder {
    pub fn new(options: RequestOptions) -> Self {
        Self { options }
    }

    pub fn build(
        &self,
        model_id: &str,
        input: GenerationInput<'_>,
        credential: &Credential,
    ) -> OutboundRequest {
        let (path, body, kind) = match input {
            GenerationInput::Chat { history, input } => {
                let mut messages: Vec<Value> = history
                    .iter()
                    .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
                    .collect();
                messages.push(json!({ "role": "user", "content": input }));

                (
                    "chat/completions",
                    json!({ "model": model_id, "messages": messages }),
                    ResponseKind::ChatCompletion,
                )
            }
            GenerationInput::Code { language, input } => (
                "chat/completions",
                json!({
                    "model": model_id,
                    "messages": [
                        { "role": "system", "content": code_system_prompt(language) },
                        { "role": "user", "content": input }
                    ]
                }),
                ResponseKind::ChatCompletion,
            ),
            GenerationInput::Image { prompt } => (
                "images/generations",
                json!({
                    "model": model_id,
                    "prompt": prompt,
                    "n": self.options.image_count,
                    "size": self.options.image_size,
                }),
                ResponseKind::ImageGeneration,
            ),
        };

        OutboundRequest {
            endpoint: format!("{}/{}", self.options.base_url.trim_end_matches('/'), path),
            method: "POST",
            headers: self.headers(credential),
            body,
            kind,
        }
    }

    fn headers(&self, credential: &Credential) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", credential.get()),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("HTTP-Referer".to_string(), self.options.referer.clone()),
            ("X-Title".to_string(), self.options.title.clone()),
        ]
    }
}

/// System instruction that asks for code only, in the given language
pub fn code_system_prompt(language: &str) -> String {
    format!(
        "You are a coding assistant. Generate clean, well-commented {} code based on the user's request. Only return the code without explanations.",
        language
    )
}
