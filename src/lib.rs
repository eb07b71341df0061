//! Model Studio - one front end for chat, code and image models on OpenRouter
//!
//! The studio keeps a static catalog of hosted models, an in-memory API key
//! and one session controller per capability. Free text is routed to the
//! controller of the selected model's category, which builds the provider
//! request, sends it through a [`api::Transport`] and folds the reply into
//! its own state.
//!
//! ## Key Features
//!
//! - **Model Registry**: Catalog lookup with category fallback
//! - **Session Controllers**: Idle, pending, succeeded or failed per capability
//! - **Request Builder**: OpenRouter chat completion and image generation bodies
//! - **Usage Tracking**: Request and token counters per category

pub mod api;
pub mod config;
pub mod credential;
pub mod metrics;
pub mod registry;
pub mod session;
pub mod tui;

pub use api::{OpenRouterClient, RequestBuilder, Transport, TransportError};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use credential::Credential;
pub use metrics::{UsageSummary, UsageTracker};
pub use registry::{Category, Model, ModelRegistry};
pub use session::{
    ChatSession, CodeSession, ImageSession, SessionController, SessionState, Studio, StudioError,
    SubmitRejected,
};
