//! Image generation controller

use super::{JobTracker, RequestContext, RequestJob, SessionController, SessionState, SubmitRejected};
use crate::api::{GenerationInput, OutboundRequest, ProviderReply, TokenUsage, TransportError};
use crate::registry::Category;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageResult {
    pub url: String,
}

#[derive(Debug, Default)]
pub struct ImageSession {
    tracker: JobTracker,
    result: Option<ImageResult>,
}

impl ImageSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self) -> Option<&ImageResult> {
        self.result.as_ref()
    }
}

impl SessionController for ImageSession {
    fn category(&self) -> Category {
        Category::Image
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
            GenerationInput::Image { prompt: input },
            ctx.credential,
        );
        let job = self.tracker.start(Category::Image, ctx.model_id, input);

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
            Ok(ProviderReply::Image { url }) => {
                self.result = Some(ImageResult { url });
                self.tracker.succeed(&mut job, None);
            }
            Ok(ProviderReply::Completion { .. }) => {
                self.tracker.fail_with(
                    &mut job,
                    &TransportError::Malformed("text reply to an image request".into()),
                );
            }
            Err(e) => self.tracker.fail_with(&mut job, &e),
        }

        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestBuilder;
    use crate::credential::Credential;
    use crate::session::testing::ScriptedTransport;
    use crate::session::JobState;

    #[tokio::test]
    async fn test_red_fox_scenario() {
        let builder = RequestBuilder::default();
        let credential = Credential::from_secret("sk-test");
        let ctx = RequestContext {
            builder: &builder,
            credential: &credential,
            model_id: "stable-diffusion-xl",
        };
        let transport =
            ScriptedTransport::new().reply(200, r#"{"data":[{"url":"https://x/img.png"}]}"#);
        let mut image = ImageSession::new();

        let state = image.submit(&transport, &ctx, "a red fox").await.unwrap();

        assert_eq!(state, JobState::Succeeded);
        assert_eq!(image.state(), &SessionState::Succeeded);
        assert_eq!(
            image.result(),
            Some(&ImageResult {
                url: "https://x/img.png".into()
            })
        );
        assert_eq!(transport.sent()[0].body["prompt"], "a red fox");
    }

    #[tokio::test]
    async fn test_provider_error_on_ok_status() {
        let builder = RequestBuilder::default();
        let credential = Credential::from_secret("sk-test");
        let ctx = RequestContext {
            builder: &builder,
            credential: &credential,
            model_id: "stable-diffusion-xl",
        };
        let transport =
            ScriptedTransport::new().reply(200, r#"{"error":{"message":"invalid model"}}"#);
        let mut image = ImageSession::new();

        image.submit(&transport, &ctx, "a red fox").await.unwrap();

        assert_eq!(image.state(), &SessionState::Failed("invalid model".into()));
        assert!(image.result().is_none());
    }

    #[tokio::test]
    async fn test_missing_url_fails() {
        let builder = RequestBuilder::default();
        let credential = Credential::from_secret("sk-test");
        let ctx = RequestContext {
            builder: &builder,
            credential: &credential,
            model_id: "stable-diffusion-xl",
        };
        let transport = ScriptedTransport::new().reply(200, r#"{"data":[]}"#);
        let mut image = ImageSession::new();

        image.submit(&transport, &ctx, "a red fox").await.unwrap();

        assert!(!image.state().is_pending());
        assert_eq!(image.state().error(), Some("Unexpected response from provider"));
    }

    #[tokio::test]
    async fn test_empty_credential_never_sends() {
        let builder = RequestBuilder::default();
        let credential = Credential::new();
        let ctx = RequestContext {
            builder: &builder,
            credential: &credential,
            model_id: "stable-diffusion-xl",
        };
        let transport = ScriptedTransport::new();
        let mut image = ImageSession::new();

        assert_eq!(
            image.submit(&transport, &ctx, "a red fox").await,
            Err(SubmitRejected::MissingCredential)
        );
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_second_begin_while_pending_is_noop() {
        let builder = RequestBuilder::default();
        let credential = Credential::from_secret("sk-test");
        let ctx = RequestContext {
            builder: &builder,
            credential: &credential,
            model_id: "stable-diffusion-xl",
        };
        let mut image = ImageSession::new();

        let (_job, _) = image.begin(&ctx, "first").unwrap();
        assert!(matches!(image.begin(&ctx, "second"), Err(SubmitRejected::Busy)));
        assert!(image.result().is_none());
        assert!(image.state().is_pending());
    }
}
