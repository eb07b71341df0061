//! Routes user input to the controller of the selected model's category

use super::{
    ChatSession, CodeSession, ImageSession, JobState, RequestContext, SessionController,
    SessionState, SubmitRejected,
};
use crate::api::{RequestBuilder, Transport};
use crate::config::Config;
use crate::credential::Credential;
use crate::metrics::UsageTracker;
use crate::registry::{self, Category, Model, ModelRegistry};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudioError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown language: {0}. Available: {1}")]
    UnknownLanguage(String, String),
}

/// Controller for the active category
pub enum ActiveSession<'a> {
    Chat(&'a mut ChatSession),
    Code(&'a mut CodeSession),
    Image(&'a mut ImageSession),
}

/// Model selection, credential and one controller per capability
pub struct Studio {
    registry: ModelRegistry,
    selected: String,
    credential: Credential,
    builder: RequestBuilder,
    chat: ChatSession,
    code: CodeSession,
    image: ImageSession,
    usage: UsageTracker,
}

impl Studio {
    pub fn new(builder: RequestBuilder, include_history: bool, language: &str) -> Self {
        let registry = ModelRegistry::new();
        Self {
            selected: registry.default_model().id.to_string(),
            registry,
            credential: Credential::new(),
            builder,
            chat: ChatSession::new(include_history),
            code: CodeSession::new(language),
            image: ImageSession::new(),
            usage: UsageTracker::new(),
        }
    }

    /// Studio set up from the loaded config; an unknown default model is logged and skipped
    pub fn from_config(config: &Config) -> Self {
        let mut studio = Self::new(
            RequestBuilder::new(config.request_options()),
            config.chat.include_history,
            &config.code.default_language,
        );
        if let Err(e) = studio.select_model(&config.studio.default_model) {
            warn!("{}, starting with {}", e, studio.selected_id());
        }
        studio
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn select_model(&mut self, id: &str) -> Result<&'static Model, StudioError> {
        let model = self
            .registry
            .find(id)
            .ok_or_else(|| StudioError::UnknownModel(id.to_string()))?;
        self.selected = model.id.to_string();
        info!(model = model.id, category = %model.category, "Model selected");
        Ok(model)
    }

    pub fn selected_id(&self) -> &str {
        &self.selected
    }

    pub fn selected_model(&self) -> Option<&'static Model> {
        self.registry.find(&self.selected)
    }

    /// Category of the selected model, chat when it does not resolve
    pub fn category(&self) -> Category {
        self.registry.category_of(&self.selected)
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn set_credential(&mut self, value: impl Into<String>) {
        self.credential.set(value);
    }

    pub fn set_language(&mut self, language: &str) -> Result<(), StudioError> {
        if self.code.set_language(language) {
            Ok(())
        } else {
            Err(StudioError::UnknownLanguage(
                language.to_string(),
                registry::CODE_LANGUAGES.join(", "),
            ))
        }
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn code(&self) -> &CodeSession {
        &self.code
    }

    pub fn image(&self) -> &ImageSession {
        &self.image
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// State of the controller behind the selected model
    pub fn active_state(&self) -> &SessionState {
        match self.category() {
            Category::Chat => self.chat.state(),
            Category::Code => self.code.state(),
            Category::Image => self.image.state(),
        }
    }

    pub fn active(&mut self) -> ActiveSession<'_> {
        match self.category() {
            Category::Chat => ActiveSession::Chat(&mut self.chat),
            Category::Code => ActiveSession::Code(&mut self.code),
            Category::Image => ActiveSession::Image(&mut self.image),
        }
    }

    /// Send `input` through the active controller
    pub async fn submit(
        &mut self,
        transport: &dyn Transport,
        input: &str,
    ) -> Result<JobState, SubmitRejected> {
        let category = self.category();
        let ctx = RequestContext {
            builder: &self.builder,
            credential: &self.credential,
            model_id: &self.selected,
        };

        let controller: &mut dyn SessionController = match category {
            Category::Chat => &mut self.chat,
            Category::Code => &mut self.code,
            Category::Image => &mut self.image,
        };

        let state = controller.submit(transport, &ctx, input).await?;
        match state {
            JobState::Succeeded => self.usage.record_success(category, controller.last_usage()),
            JobState::Failed => self.usage.record_failure(category),
            JobState::Pending => {}
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::ScriptedTransport;

    fn studio() -> Studio {
        Studio::new(RequestBuilder::default(), false, "javascript")
    }

    #[test]
    fn test_starts_on_default_chat_model() {
        let studio = studio();
        assert_eq!(studio.selected_id(), "mistral-7b-instruct");
        assert_eq!(studio.category(), Category::Chat);
        assert!(studio.credential().is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = crate::config::ConfigBuilder::new()
            .default_model("stable-diffusion-xl")
            .default_language("go")
            .build();
        let studio = Studio::from_config(&config);
        assert_eq!(studio.category(), Category::Image);
        assert_eq!(studio.code().language(), "go");

        let config = crate::config::ConfigBuilder::new()
            .default_model("not-a-model")
            .build();
        assert_eq!(Studio::from_config(&config).selected_id(), "mistral-7b-instruct");
    }

    #[test]
    fn test_select_model_switches_category() {
        let mut studio = studio();
        studio.select_model("stable-diffusion-xl").unwrap();
        assert_eq!(studio.category(), Category::Image);
        assert!(matches!(studio.active(), ActiveSession::Image(_)));

        studio.select_model("deepseek-coder-33b").unwrap();
        assert!(matches!(studio.active(), ActiveSession::Code(_)));
    }

    #[test]
    fn test_unknown_model_rejected() {
        let mut studio = studio();
        let err = studio.select_model("gpt-5").unwrap_err();
        assert_eq!(err, StudioError::UnknownModel("gpt-5".into()));
        assert_eq!(studio.selected_id(), "mistral-7b-instruct");
    }

    #[test]
    fn test_unknown_language_rejected() {
        let mut studio = studio();
        assert!(studio.set_language("rust").is_ok());
        assert!(matches!(
            studio.set_language("cobol"),
            Err(StudioError::UnknownLanguage(_, _))
        ));
        assert_eq!(studio.code().language(), "rust");
    }

    #[tokio::test]
    async fn test_empty_credential_blocks_every_category() {
        let transport = ScriptedTransport::new();
        let mut studio = studio();

        for id in ["mistral-7b-instruct", "codellama-34b-instruct", "stable-diffusion-xl"] {
            studio.select_model(id).unwrap();
            assert_eq!(
                studio.submit(&transport, "hello").await,
                Err(SubmitRejected::MissingCredential)
            );
        }
        assert_eq!(transport.calls(), 0);
        assert_eq!(studio.usage().summary().total_requests(), 0);
    }

    #[tokio::test]
    async fn test_dispatches_to_selected_category() {
        let transport = ScriptedTransport::new()
            .reply(200, r#"{"choices":[{"message":{"content":"Hi there"}}],"usage":{"prompt_tokens":3,"completion_tokens":2}}"#)
            .reply(200, r#"{"data":[{"url":"https://x/img.png"}]}"#);
        let mut studio = studio();
        studio.set_credential("sk-test");

        studio.submit(&transport, "Hello").await.unwrap();
        studio.select_model("stable-diffusion-xl").unwrap();
        studio.submit(&transport, "a red fox").await.unwrap();

        assert_eq!(studio.chat().transcript().len(), 2);
        assert_eq!(studio.image().result().unwrap().url, "https://x/img.png");
        assert_eq!(studio.code().state(), &SessionState::Idle);

        let sent = transport.sent();
        assert!(sent[0].endpoint.ends_with("/chat/completions"));
        assert!(sent[1].endpoint.ends_with("/images/generations"));
        assert_eq!(studio.usage().summary().total_tokens(), 5);
    }

    #[tokio::test]
    async fn test_controllers_pend_independently() {
        let builder = RequestBuilder::default();
        let credential = Credential::from_secret("sk-test");
        let chat_ctx = RequestContext {
            builder: &builder,
            credential: &credential,
            model_id: "mistral-7b-instruct",
        };
        let image_ctx = RequestContext {
            model_id: "stable-diffusion-xl",
            ..chat_ctx
        };
        let transport = ScriptedTransport::new()
            .reply(200, r#"{"choices":[{"message":{"content":"Hi"}}]}"#)
            .reply(200, r#"{"data":[{"url":"https://x/img.png"}]}"#);
        let mut chat = ChatSession::new(false);
        let mut image = ImageSession::new();

        let (chat_job, chat_request) = chat.begin(&chat_ctx, "Hello").unwrap();
        let (image_job, image_request) = image.begin(&image_ctx, "a fox").unwrap();
        assert!(chat.state().is_pending() && image.state().is_pending());

        let (chat_reply, image_reply) =
            tokio::join!(transport.send(&chat_request), transport.send(&image_request));
        chat.resolve(chat_job, chat_reply);
        image.resolve(image_job, image_reply);

        assert_eq!(chat.state(), &SessionState::Succeeded);
        assert_eq!(image.state(), &SessionState::Succeeded);
    }
}
