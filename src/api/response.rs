//! Provider response normalization

use super::{ResponseKind, TransportError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized provider answer
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    /// Text from a chat completion (chat and code)
    Completion { content: String, usage: TokenUsage },
    /// Location of a generated image
    Image { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the response
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_tokens == 0
    }
}

/// Turn a raw HTTP status and body into a reply or a typed error.
///
/// A structured `error` object wins over everything else, even on a 200.
pub fn normalize(kind: ResponseKind, status: u16, body: &str) -> Result<ProviderReply, TransportError> {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(e) => {
            if !is_success(status) {
                return Err(TransportError::Provider {
                    status: Some(status),
                    message: status_message(status),
                });
            }
            return Err(TransportError::Malformed(format!("body is not JSON: {}", e)));
        }
    };

    if let Some(message) = provider_error(&json, kind) {
        return Err(TransportError::Provider {
            status: Some(status),
            message,
        });
    }

    if !is_success(status) {
        return Err(TransportError::Provider {
            status: Some(status),
            message: status_message(status),
        });
    }

    match kind {
        ResponseKind::ChatCompletion => parse_completion(&json),
        ResponseKind::ImageGeneration => parse_image(&json),
    }
}

fn parse_completion(json: &Value) -> Result<ProviderReply, TransportError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| TransportError::Malformed("missing choices[0].message.content".into()))?
        .to_string();

    let usage = &json["usage"];
    let mut tokens = TokenUsage::new(
        token_count(&usage["prompt_tokens"]),
        token_count(&usage["completion_tokens"]),
    );
    if usage["total_tokens"].is_u64() {
        tokens.total_tokens = token_count(&usage["total_tokens"]);
    }

    Ok(ProviderReply::Completion {
        content,
        usage: tokens,
    })
}

/// Provider-reported count, clamped to `u32::MAX`
fn token_count(value: &Value) -> u32 {
    value
        .as_u64()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn parse_image(json: &Value) -> Result<ProviderReply, TransportError> {
    let url = json["data"][0]["url"]
        .as_str()
        .ok_or_else(|| TransportError::Malformed("missing data[0].url".into()))?
        .to_string();

    Ok(ProviderReply::Image { url })
}

/// Extract the provider's own error text, if the body carries an error
fn provider_error(json: &Value, kind: ResponseKind) -> Option<String> {
    let error = json.get("error")?;
    if error.is_null() {
        return None;
    }

    let message = error["message"]
        .as_str()
        .or_else(|| error.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match kind {
            ResponseKind::ImageGeneration => "Failed to generate image".to_string(),
            ResponseKind::ChatCompletion => "Provider returned an error".to_string(),
        });

    Some(message)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn status_message(status: u16) -> String {
    match StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("Request failed: {} {}", status, reason),
        None => format!("Request failed with status {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_completion() {
        let body = r#"{"choices":[{"message":{"content":"Hi there"}}],"usage":{"prompt_tokens":5,"completion_tokens":3}}"#;
        let reply = normalize(ResponseKind::ChatCompletion, 200, body).unwrap();
        assert_eq!(
            reply,
            ProviderReply::Completion {
                content: "Hi there".to_string(),
                usage: TokenUsage::new(5, 3),
            }
        );
    }

    #[test]
    fn test_completion_without_usage() {
        let body = r#"{"choices":[{"message":{"content":"ok"}}]}"#;
        match normalize(ResponseKind::ChatCompletion, 200, body).unwrap() {
            ProviderReply::Completion { usage, .. } => assert!(usage.is_empty()),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_huge_usage_counts_saturate() {
        let body = r#"{"choices":[{"message":{"content":"ok"}}],"usage":{"prompt_tokens":4000000000,"completion_tokens":1000000000}}"#;
        match normalize(ResponseKind::ChatCompletion, 200, body).unwrap() {
            ProviderReply::Completion { usage, .. } => {
                assert_eq!(usage.prompt_tokens, 4_000_000_000);
                assert_eq!(usage.completion_tokens, 1_000_000_000);
                assert_eq!(usage.total_tokens, u32::MAX);
            }
            other => panic!("unexpected reply: {:?}", other),
        }

        let body = r#"{"choices":[{"message":{"content":"ok"}}],"usage":{"prompt_tokens":5000000000,"completion_tokens":2,"total_tokens":7}}"#;
        match normalize(ResponseKind::ChatCompletion, 200, body).unwrap() {
            ProviderReply::Completion { usage, .. } => {
                assert_eq!(usage.prompt_tokens, u32::MAX);
                assert_eq!(usage.total_tokens, 7);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_missing_choices_is_malformed() {
        let err = normalize(ResponseKind::ChatCompletion, 200, r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
        assert_eq!(err.user_message(), "Unexpected response from provider");
    }

    #[test]
    fn test_image_generation() {
        let body = r#"{"data":[{"url":"https://x/img.png"}]}"#;
        let reply = normalize(ResponseKind::ImageGeneration, 200, body).unwrap();
        assert_eq!(
            reply,
            ProviderReply::Image {
                url: "https://x/img.png".to_string()
            }
        );
    }

    #[test]
    fn test_error_object_on_success_status() {
        let body = r#"{"error":{"message":"invalid model"}}"#;
        let err = normalize(ResponseKind::ImageGeneration, 200, body).unwrap_err();
        assert_eq!(err.user_message(), "invalid model");
    }

    #[test]
    fn test_error_object_without_message() {
        let err = normalize(ResponseKind::ImageGeneration, 400, r#"{"error":{}}"#).unwrap_err();
        assert_eq!(err.user_message(), "Failed to generate image");
    }

    #[test]
    fn test_non_json_error_status() {
        let err = normalize(ResponseKind::ChatCompletion, 502, "<html>bad gateway</html>").unwrap_err();
        match err {
            TransportError::Provider { status, message } => {
                assert_eq!(status, Some(502));
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_json_success_is_malformed() {
        let err = normalize(ResponseKind::ImageGeneration, 200, "not json").unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }
}
