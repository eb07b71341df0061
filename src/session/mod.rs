//! Request/response session controllers, one per capability
//!
//! Every controller runs the same small state machine:
//!
//! ```text
//! Idle --begin--> Pending --resolve(ok)--> Succeeded --begin--> Pending ...
//!                         --resolve(err)-> Failed    --begin--> Pending ...
//! ```
//!
//! `begin` refuses to start while a job is pending, without a credential,
//! or with blank input. `resolve` always leaves `Pending`.

mod chat;
mod code;
mod image;
mod studio;

pub use chat::{ChatMessage, ChatSession};
pub use code::{CodeResult, CodeSession};
pub use image::{ImageResult, ImageSession};
pub use studio::{ActiveSession, Studio, StudioError};

use crate::api::{OutboundRequest, ProviderReply, RequestBuilder, TokenUsage, Transport, TransportError};
use crate::credential::Credential;
use crate::registry::Category;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

/// Current state of a session controller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    /// Human readable failure description
    Failed(String),
}

impl SessionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SessionState::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Pending => "pending",
            SessionState::Succeeded => "succeeded",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Why a submit was refused before any request was made
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("No API key configured")]
    MissingCredential,

    #[error("Input is empty")]
    EmptyInput,

    #[error("A request is already in progress")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Succeeded,
    Failed,
}

/// One in-flight call to the provider
#[derive(Debug, Clone)]
pub struct RequestJob {
    pub id: u64,
    pub category: Category,
    pub model_id: String,
    pub input: String,
    pub state: JobState,
}

/// Everything a controller needs from its surroundings to build a request
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub builder: &'a RequestBuilder,
    pub credential: &'a Credential,
    pub model_id: &'a str,
}

/// Shared bookkeeping behind every controller: state, pending job and input buffer
#[derive(Debug, Default)]
pub(crate) struct JobTracker {
    state: SessionState,
    pending: Option<u64>,
    next_id: u64,
    input: String,
    last_usage: Option<TokenUsage>,
}

impl JobTracker {
    fn check(&self, input: &str, credential: &Credential) -> Result<(), SubmitRejected> {
        if self.pending.is_some() {
            return Err(SubmitRejected::Busy);
        }
        if credential.is_empty() {
            return Err(SubmitRejected::MissingCredential);
        }
        if input.trim().is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }
        Ok(())
    }

    fn start(&mut self, category: Category, model_id: &str, input: &str) -> RequestJob {
        self.next_id += 1;
        self.pending = Some(self.next_id);
        self.state = SessionState::Pending;
        self.last_usage = None;

        info!(job = self.next_id, %category, model = model_id, "Request pending");

        RequestJob {
            id: self.next_id,
            category,
            model_id: model_id.to_string(),
            input: input.to_string(),
            state: JobState::Pending,
        }
    }

    /// Returns false when `job` is not the one currently pending
    fn accepts(&self, job: &RequestJob) -> bool {
        self.pending == Some(job.id)
    }

    fn succeed(&mut self, job: &mut RequestJob, usage: Option<TokenUsage>) {
        self.pending = None;
        self.state = SessionState::Succeeded;
        self.last_usage = usage;
        self.input.clear();
        job.state = JobState::Succeeded;
        info!(job = job.id, category = %job.category, "Request succeeded");
    }

    fn fail(&mut self, job: &mut RequestJob, message: String) {
        warn!(job = job.id, category = %job.category, "Request failed: {}", message);
        self.pending = None;
        self.state = SessionState::Failed(message);
        job.state = JobState::Failed;
    }

    fn fail_with(&mut self, job: &mut RequestJob, error: &TransportError) {
        self.fail(job, error.user_message());
    }
}

/// A capability-specific request/response state machine
#[async_trait]
pub trait SessionController: Send {
    fn category(&self) -> Category;

    fn state(&self) -> &SessionState;

    /// Text waiting to be submitted
    fn input(&self) -> &str;

    fn set_input(&mut self, input: &str);

    /// Token usage reported by the last successful completion
    fn last_usage(&self) -> Option<TokenUsage>;

    /// Validate, move to `Pending` and build the request to send
    fn begin(
        &mut self,
        ctx: &RequestContext<'_>,
        input: &str,
    ) -> Result<(RequestJob, OutboundRequest), SubmitRejected>;

    /// Settle the pending job; a stale job is returned untouched
    fn resolve(
        &mut self,
        job: RequestJob,
        outcome: Result<ProviderReply, TransportError>,
    ) -> RequestJob;

    /// Begin, send once, resolve
    async fn submit(
        &mut self,
        transport: &dyn Transport,
        ctx: &RequestContext<'_>,
        input: &str,
    ) -> Result<JobState, SubmitRejected> {
        let (job, request) = self.begin(ctx, input)?;
        let outcome = transport.send(&request).await;
        Ok(self.resolve(job, outcome).state)
    }

    /// Submit whatever is in the input buffer
    async fn submit_buffer(
        &mut self,
        transport: &dyn Transport,
        ctx: &RequestContext<'_>,
    ) -> Result<JobState, SubmitRejected> {
        let input = self.input().to_string();
        self.submit(transport, ctx, &input).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport double that replays canned provider bodies

    use crate::api::{
        normalize, OutboundRequest, ProviderReply, Transport, TransportError,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub enum Scripted {
        Body(u16, String),
        Network,
    }

    #[derive(Default)]
    pub struct ScriptedTransport {
        replies: Mutex<VecDeque<Scripted>>,
        sent: Mutex<Vec<OutboundRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, status: u16, body: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Scripted::Body(status, body.to_string()));
            self
        }

        pub fn network_failure(self) -> Self {
            self.replies.lock().unwrap().push_back(Scripted::Network);
            self
        }

        pub fn calls(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        pub fn sent(&self) -> Vec<OutboundRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &OutboundRequest) -> Result<ProviderReply, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Body(status, body)) => normalize(request.kind, status, &body),
                Some(Scripted::Network) | None => {
                    Err(TransportError::Network("connection refused".to_string()))
                }
            }
        }
    }
}
