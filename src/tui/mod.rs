//! Interactive terminal UI for Model Studio
//!
//! A line-oriented shell that sends free text to the selected model and
//! exposes model selection, the API key and results through slash commands.

pub mod clipboard;
pub mod commands;
pub mod prompt;
pub mod renderer;
pub mod spinner;
pub mod theme;

use crate::api::OpenRouterClient;
use crate::registry::{self, Category};
use crate::session::{ActiveSession, JobState, SessionController, Studio, SubmitRejected};

use clipboard::ClipboardHandle;
use commands::{parse_command, render_help, SlashCommand};
use prompt::PromptHandler;
use renderer::TerminalRenderer;
use spinner::PendingSpinner;

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MISSING_KEY_MESSAGE: &str =
    "No API key set. Use /key to configure your OpenRouter API key.";

/// Interactive shell driving a [`Studio`] over the OpenRouter client
pub struct InteractiveShell {
    studio: Studio,
    client: OpenRouterClient,
    renderer: TerminalRenderer,
    prompt_handler: PromptHandler,
    clipboard: ClipboardHandle,
}

impl InteractiveShell {
    pub fn new(studio: Studio, client: OpenRouterClient) -> Self {
        Self {
            studio,
            client,
            renderer: TerminalRenderer::new(),
            prompt_handler: PromptHandler::new(),
            clipboard: ClipboardHandle::new(),
        }
    }

    /// Run the interactive shell main loop
    pub async fn run(&mut self) -> Result<()> {
        let model = self
            .studio
            .selected_model()
            .unwrap_or_else(|| self.studio.registry().default_model());
        self.renderer.render_banner(
            env!("CARGO_PKG_VERSION"),
            model,
            &self.studio.credential().masked(),
        );
        if self.studio.credential().is_empty() {
            self.renderer.render_info(MISSING_KEY_MESSAGE);
            println!();
        }

        loop {
            let category = self.studio.category();
            let input = match self
                .prompt_handler
                .read_line(category.as_str(), self.renderer.prompt_color(category))
            {
                Some(input) => input,
                None => {
                    // EOF (Ctrl+D)
                    self.render_session_summary();
                    break;
                }
            };

            if input.is_empty() {
                continue;
            }

            if let Some(cmd) = parse_command(&input) {
                match self.handle_command(cmd).await {
                    CommandResult::Continue => continue,
                    CommandResult::Quit => {
                        self.render_session_summary();
                        break;
                    }
                }
            } else {
                self.process_input(&input).await;
            }
        }

        Ok(())
    }

    /// Handle a slash command
    async fn handle_command(&mut self, cmd: SlashCommand) -> CommandResult {
        match cmd {
            SlashCommand::Help => render_help(&self.renderer),
            SlashCommand::Quit => return CommandResult::Quit,
            SlashCommand::Models => self
                .renderer
                .render_models(self.studio.registry().list(), self.studio.selected_id()),
            SlashCommand::Model(Some(id)) => match self.studio.select_model(&id) {
                Ok(model) => self.renderer.render_success(&format!(
                    "Model set to: {} ({})",
                    model.display_name, model.category
                )),
                Err(e) => {
                    self.renderer.render_error(&e.to_string());
                    self.renderer.render_info("Use /models to list available models.");
                }
            },
            SlashCommand::Model(None) => self.renderer.render_info(&format!(
                "Current model: {} [{}]",
                self.studio.selected_id(),
                self.studio.category()
            )),
            SlashCommand::Key(value) => self.handle_key(value),
            SlashCommand::Lang(Some(language)) => match self.studio.set_language(&language) {
                Ok(()) => self
                    .renderer
                    .render_success(&format!("Code language set to: {}", language)),
                Err(e) => self.renderer.render_error(&e.to_string()),
            },
            SlashCommand::Lang(None) => {
                self.renderer.render_info(&format!(
                    "Current language: {}",
                    self.studio.code().language()
                ));
                self.renderer.render_info(&format!(
                    "Available: {}",
                    registry::CODE_LANGUAGES.join(", ")
                ));
            }
            SlashCommand::Copy => self.copy_code(),
            SlashCommand::Save(path) => self.save_result(path).await,
            SlashCommand::Status => self.render_status(),
            SlashCommand::Stats => self
                .renderer
                .render_usage_summary(&self.studio.usage().summary()),
            SlashCommand::History => self
                .renderer
                .render_transcript(self.studio.chat().transcript()),
            SlashCommand::Unknown(name) => self
                .renderer
                .render_error(&format!("Unknown command: {}. Type /help for commands.", name)),
        }
        CommandResult::Continue
    }

    fn handle_key(&mut self, value: Option<String>) {
        let value = match value {
            Some(value) => Some(value),
            None => self
                .prompt_handler
                .read_secret("OpenRouter API key:", self.renderer.command_color()),
        };
        match value {
            Some(value) if !value.trim().is_empty() => {
                self.studio.set_credential(value.trim());
                self.renderer.render_success(&format!(
                    "API key set: {}",
                    self.studio.credential().masked()
                ));
            }
            _ => self.renderer.render_info("API key unchanged."),
        }
    }

    /// Submit free text to the controller of the selected model
    async fn process_input(&mut self, input: &str) {
        let category = self.studio.category();
        let mut spinner = PendingSpinner::new();
        spinner.start(category);
        let outcome = self.studio.submit(&self.client, input).await;
        spinner.stop();

        match outcome {
            Err(SubmitRejected::MissingCredential) => self.renderer.render_error(MISSING_KEY_MESSAGE),
            Err(SubmitRejected::EmptyInput) => {}
            Err(SubmitRejected::Busy) => self
                .renderer
                .render_info("A request is already pending for this model."),
            Ok(JobState::Failed) => {
                let msg = self.studio.active_state().error().unwrap_or("Request failed");
                self.renderer.render_error(msg);
            }
            Ok(JobState::Pending) => debug!("submit returned while still pending"),
            Ok(JobState::Succeeded) => self.render_result(),
        }
    }

    fn render_result(&mut self) {
        let model = self.studio.selected_id().to_string();
        match self.studio.active() {
            ActiveSession::Chat(chat) => {
                if let Some(reply) = chat.transcript().last() {
                    self.renderer.render_markdown(&reply.content);
                }
                self.renderer.render_usage_line(chat.last_usage(), &model);
            }
            ActiveSession::Code(code) => {
                if let Some(result) = code.result() {
                    self.renderer.render_code(result);
                }
                self.renderer.render_usage_line(code.last_usage(), &model);
                self.renderer.render_info("Use /copy or /save [path] to keep it");
            }
            ActiveSession::Image(image) => {
                if let Some(result) = image.result() {
                    self.renderer.render_image(result);
                }
            }
        }
    }

    fn copy_code(&mut self) {
        let Some(result) = self.studio.code().result() else {
            self.renderer.render_info("No generated code to copy yet.");
            return;
        };
        match self.clipboard.copy(&result.code) {
            Ok(()) => self.renderer.render_success("Code copied to clipboard"),
            Err(e) => self.renderer.render_error(&e),
        }
    }

    /// Save the result of the active category to disk
    async fn save_result(&self, path: Option<String>) {
        match self.studio.category() {
            Category::Image => {
                let Some(result) = self.studio.image().result() else {
                    self.renderer.render_info("No generated image to save yet.");
                    return;
                };
                let path = path
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_save_path(Category::Image, ""));
                match self.client.download(&result.url).await {
                    Ok(bytes) => self.write_file(&path, &bytes).await,
                    Err(e) => self.renderer.render_error(&e.user_message()),
                }
            }
            Category::Code => {
                let Some(result) = self.studio.code().result() else {
                    self.renderer.render_info("No generated code to save yet.");
                    return;
                };
                let path = path
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_save_path(Category::Code, &result.language));
                self.write_file(&path, result.code.as_bytes()).await;
            }
            Category::Chat => self
                .renderer
                .render_info("Nothing to save for chat. Use /history to review the transcript."),
        }
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) {
        match tokio::fs::write(path, bytes).await {
            Ok(()) => self
                .renderer
                .render_success(&format!("Saved to {}", path.display())),
            Err(e) => {
                warn!(path = %path.display(), "Failed to save result: {}", e);
                self.renderer
                    .render_error(&format!("Failed to write {}: {}", path.display(), e));
            }
        }
    }

    /// Render current status
    fn render_status(&self) {
        println!();
        self.renderer.render_system("Current Status:");
        let model = self
            .studio
            .selected_model()
            .map(|m| m.display_name)
            .unwrap_or("unknown");
        self.renderer
            .render_field("Model:", &format!("{} ({})", self.studio.selected_id(), model));
        self.renderer
            .render_field("Category:", self.studio.category().as_str());
        self.renderer
            .render_field("API key:", &self.studio.credential().masked());
        self.renderer
            .render_field("Code language:", self.studio.code().language());
        self.renderer.render_field(
            "Chat history:",
            if self.studio.chat().include_history() { "replayed" } else { "latest turn only" },
        );
        self.renderer.render_field(
            "Inputs this session:",
            &self.prompt_handler.history_len().to_string(),
        );
        let state = self.studio.active_state();
        self.renderer.render_field("Request:", state.label());
        if let Some(error) = state.error() {
            self.renderer.render_field("Last error:", error);
        }
        println!();
    }

    /// Render session summary on exit
    fn render_session_summary(&self) {
        let summary = self.studio.usage().summary();
        println!();
        self.renderer.render_system("Session Summary:");
        self.renderer.render_info(&format!(
            "{} requests, {} total tokens",
            summary.total_requests(),
            summary.total_tokens()
        ));
        self.renderer.render_info("Goodbye!");
        println!();
    }
}

/// Result of handling a slash command
enum CommandResult {
    Continue,
    Quit,
}

/// File name used by /save when no path is given
fn default_save_path(category: Category, language: &str) -> PathBuf {
    match category {
        Category::Image => PathBuf::from(format!(
            "generated-image-{}.png",
            Utc::now().timestamp_millis()
        )),
        _ => PathBuf::from(format!(
            "generated-code.{}",
            registry::language_extension(language)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_save_paths() {
        let image = default_save_path(Category::Image, "");
        let name = image.to_string_lossy();
        assert!(name.starts_with("generated-image-"));
        assert!(name.ends_with(".png"));

        assert_eq!(
            default_save_path(Category::Code, "python"),
            PathBuf::from("generated-code.py")
        );
        assert_eq!(
            default_save_path(Category::Code, "brainfuck"),
            PathBuf::from("generated-code.txt")
        );
    }
}
