//! Code generation controller

use super::{JobTracker, RequestContext, RequestJob, SessionController, SessionState, SubmitRejected};
use crate::api::{GenerationInput, OutboundRequest, ProviderReply, TokenUsage, TransportError};
use crate::registry::{self, Category};
use serde::Serialize;

/// Latest generated code without surrounding markdown fences; replaced by
/// every successful job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeResult {
    pub language: String,
    pub code: String,
}

#[derive(Debug)]
pub struct CodeSession {
    tracker: JobTracker,
    language: String,
    /// Language the pending request was built with
    requested_language: Option<String>,
    result: Option<CodeResult>,
}

impl CodeSession {
    /// Unknown languages fall back to the default one
    pub fn new(language: &str) -> Self {
        let language = if registry::is_known_language(language) {
            language
        } else {
            registry::DEFAULT_CODE_LANGUAGE
        };
        Self {
            tracker: JobTracker::default(),
            language: language.to_string(),
            requested_language: None,
            result: None,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns false and keeps the current language if `language` is not offered
    pub fn set_language(&mut self, language: &str) -> bool {
        if !registry::is_known_language(language) {
            return false;
        }
        self.language = language.to_string();
        true
    }

    pub fn result(&self) -> Option<&CodeResult> {
        self.result.as_ref()
    }
}

/// Drop a surrounding markdown fence the model may have added
pub fn strip_code_fences(code: &str) -> &str {
    let trimmed = code.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.strip_suffix("```").unwrap_or(body).trim_end()
}

impl Default for CodeSession {
    fn default() -> Self {
        Self::new(registry::DEFAULT_CODE_LANGUAGE)
    }
}

impl SessionController for CodeSession {
    fn category(&self) -> Category {
        Category::Code
    }

    fn state(&self) -> &SessionState {
        &self.tracker.state
    }

    fn input(&self) -> &str {
        &self.tracker.input
    }

    fn set_input(&mut self, input: &str) {
        self.tracker.input = input.to_string();
    }

    fn last_usage(&self) -> Option<TokenUsage> {
        self.tracker.last_usage
    }

    fn begin(
        &mut self,
        ctx: &RequestContext<'_>,
        input: &str,
    ) -> Result<(RequestJob, OutboundRequest), SubmitRejected> {
        self.tracker.check(input, ctx.credential)?;

        let request = ctx.builder.build(
            ctx.model_id,
            GenerationInput::Code {
                language: &self.language,
                input,
            },
            ctx.credential,
        );
        let job = self.tracker.start(Category::Code, ctx.model_id, input);
        self.requested_language = Some(self.language.clone());

        Ok((job, request))
    }

    fn resolve(
        &mut self,
        mut job: RequestJob,
        outcome: Result<ProviderReply, TransportError>,
    ) -> RequestJob {
        if !self.tracker.accepts(&job) {
            return job;
        }

        match outcome {
            Ok(ProviderReply::Completion { content, usage }) => {
                let language = self
                    .requested_language
                    .take()
                    .unwrap_or_else(|| self.language.clone());
                self.result = Some(CodeResult {
                    language,
                    code: strip_code_fences(&content).to_string(),
                });
                self.tracker.succeed(&mut job, Some(usage));
            }
            Ok(ProviderReply::Image { .. }) => {
                self.tracker.fail_with(
                    &mut job,
                    &TransportError::Malformed("image reply to a code request".into()),
                );
            }
            Err(e) => self.tracker.fail_with(&mut job, &e),
        }

        job
    }
}
