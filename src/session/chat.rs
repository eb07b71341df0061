//! Chat controller with an append-only transcript

use super::{JobTracker, RequestContext, RequestJob, SessionController, SessionState, SubmitRejected};
use crate::api::{
    GenerationInput, Message, OutboundRequest, ProviderReply, Role, TokenUsage, TransportError,
};
use crate::registry::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ChatSession {
    tracker: JobTracker,
    transcript: Vec<ChatMessage>,
    /// Replay earlier turns to the provider; off sends only the latest turn
    include_history: bool,
}

impl ChatSession {
    pub fn new(include_history: bool) -> Self {
        Self {
            include_history,
            ..Default::default()
        }
    }

    /// Messages in submission order
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn include_history(&self) -> bool {
        self.include_history
    }

    fn wire_history(&self) -> Vec<Message> {
        if !self.include_history {
            return Vec::new();
        }
        self.transcript
            .iter()
            .map(|m| Message::new(m.role, m.content.clone()))
            .collect()
    }
}

impl SessionController for ChatSession {
    fn category(&self) -> Category {
        Category::Chat
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

        // History is captured before the new turn so it is not sent twice
        let history = self.wire_history();
        let request = ctx.builder.build(
            ctx.model_id,
            GenerationInput::Chat {
                history: &history,
                input,
            },
            ctx.credential,
        );

        self.transcript.push(ChatMessage::new(Role::User, input));
        let job = self.tracker.start(Category::Chat, ctx.model_id, input);

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
                self.transcript.push(ChatMessage::new(Role::Assistant, content));
                self.tracker.succeed(&mut job, Some(usage));
            }
            Ok(ProviderReply::Image { .. }) => {
                self.tracker.fail_with(
                    &mut job,
                    &TransportError::Malformed("image reply to a chat request".into()),
                );
            }
            Err(e) => self.tracker.fail_with(&mut job, &e),
        }

        job
    }
}
