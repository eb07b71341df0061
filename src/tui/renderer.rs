//! Terminal rendering with markdown support

use crossterm::style::{Color, Stylize};
use termimad::MadSkin;

use super::theme::Theme;
use crate::api::{Role, TokenUsage};
use crate::metrics::UsageSummary;
use crate::registry::{Category, Model};
use crate::session::{ChatMessage, CodeResult, ImageResult};

/// Terminal renderer with markdown and styled output
pub struct TerminalRenderer {
    theme: Theme,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        let theme = Theme::default();
        let skin = Self::build_skin(&theme);
        Self { theme, skin }
    }

    fn build_skin(theme: &Theme) -> MadSkin {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(to_termimad_color(theme.title));
        skin.bold.set_fg(to_termimad_color(Color::White));
        skin.italic.set_fg(to_termimad_color(Color::DarkYellow));
        skin.inline_code.set_fg(to_termimad_color(theme.code));
        skin.code_block.set_fg(to_termimad_color(theme.code));
        skin
    }

    /// Render the welcome banner
    pub fn render_banner(&self, version: &str, model: &Model, key_status: &str) {
        println!();
        println!("{}", "  Model Studio".with(self.theme.title));
        println!(
            "  {} {}",
            "v".with(self.theme.dim),
            version.with(self.theme.dim)
        );
        println!(
            "  {} {} {}",
            "Model:".with(self.theme.dim),
            model.display_name.with(self.theme.stats),
            self.badge(model.category),
        );
        println!(
            "  {} {}",
            "API key:".with(self.theme.dim),
            key_status.with(self.theme.stats),
        );
        println!(
            "  {}",
            "Type /help for commands, /quit to exit".with(self.theme.dim)
        );
        println!();
    }

    /// Render the catalog, marking the selected model
    pub fn render_models(&self, models: &[Model], selected: &str) {
        println!();
        self.render_system("Available models:");
        for model in models {
            let marker = if model.id == selected { "*" } else { " " };
            println!(
                "  {} {:<24} {:<20} {}",
                marker.with(self.theme.success),
                model.id.with(self.theme.command),
                model.display_name.with(self.theme.assistant),
                self.badge(model.category),
            );
            println!("    {}", model.description.with(self.theme.dim));
        }
        println!();
    }

    /// Render an assistant reply with markdown formatting
    pub fn render_markdown(&self, content: &str) {
        println!();
        if has_markdown_elements(content) {
            self.skin.print_text(content);
        } else {
            println!("{}", content.with(self.theme.assistant));
        }
    }

    pub fn render_code(&self, result: &CodeResult) {
        println!();
        println!(
            "  {} {}",
            "\u{2022}".with(self.theme.dim),
            result.language.as_str().with(self.theme.code),
        );
        self.skin
            .print_text(&format!("```{}\n{}\n```", result.language, result.code));
    }

    pub fn render_image(&self, result: &ImageResult) {
        println!();
        self.render_success("Image generated");
        println!(
            "  {} {}",
            "URL:".with(self.theme.dim),
            result.url.as_str().with(self.theme.image),
        );
        self.render_info("Use /save [path] to download it");
        println!();
    }

    /// Replay the chat transcript
    pub fn render_transcript(&self, transcript: &[ChatMessage]) {
        if transcript.is_empty() {
            self.render_info("No messages yet.");
            return;
        }
        println!();
        for message in transcript {
            let color = match message.role {
                Role::User => self.theme.user,
                _ => self.theme.assistant,
            };
            println!(
                "  {} {}",
                message
                    .timestamp
                    .format("%H:%M:%S")
                    .to_string()
                    .with(self.theme.dim),
                message.role.as_str().with(color),
            );
            for line in message.content.lines() {
                println!("    {}", line.with(color));
            }
        }
        println!();
    }

    /// Render the token usage line after a response
    pub fn render_usage_line(&self, usage: Option<TokenUsage>, model: &str) {
        match usage {
            Some(usage) if !usage.is_empty() => println!(
                "\n  {} {} prompt + {} completion [{}]",
                "\u{2022}".with(self.theme.dim),
                usage.prompt_tokens.to_string().with(self.theme.stats),
                usage.completion_tokens.to_string().with(self.theme.stats),
                model.with(self.theme.dim),
            ),
            _ => println!(
                "\n  {} [{}]",
                "\u{2022}".with(self.theme.dim),
                model.with(self.theme.dim)
            ),
        }
        println!();
    }

    pub fn render_usage_summary(&self, summary: &UsageSummary) {
        println!();
        for line in summary.to_string().lines() {
            println!("  {}", line.with(self.theme.stats));
        }
        println!();
    }

    /// Render a system message
    pub fn render_system(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{25b6}".with(self.theme.system),
            msg.with(self.theme.system)
        );
    }

    /// Render an error message
    pub fn render_error(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{2717}".with(self.theme.error),
            msg.with(self.theme.error)
        );
    }

    /// Render a success message
    pub fn render_success(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{2713}".with(self.theme.success),
            msg.with(self.theme.success)
        );
    }

    /// Render info text
    pub fn render_info(&self, msg: &str) {
        println!("  {}", msg.with(self.theme.dim));
    }

    /// Styled "label value" line used by /status
    pub fn render_field(&self, label: &str, value: &str) {
        println!(
            "  {} {}",
            label.with(self.theme.dim),
            value.with(self.theme.stats)
        );
    }

    fn badge(&self, category: Category) -> String {
        format!("[{}]", category)
            .with(self.theme.category(category))
            .to_string()
    }

    /// Prompt color for the active category
    pub fn prompt_color(&self, category: Category) -> Color {
        self.theme.category(category)
    }

    pub fn command_color(&self) -> Color {
        self.theme.command
    }

    pub fn dim_color(&self) -> Color {
        self.theme.dim
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if content has markdown elements worth rendering through the skin
fn has_markdown_elements(content: &str) -> bool {
    content.contains("```")
        || content.contains("## ")
        || content.contains("# ")
        || content.contains("**")
        || content.contains("| ")
        || content.contains("- ")
}

/// Convert crossterm Color to termimad color
fn to_termimad_color(color: Color) -> termimad::crossterm::style::Color {
    // termimad re-exports crossterm, so these types are compatible
    match color {
        Color::Black => termimad::crossterm::style::Color::Black,
        Color::DarkGrey => termimad::crossterm::style::Color::DarkGrey,
        Color::Red => termimad::crossterm::style::Color::Red,
        Color::DarkRed => termimad::crossterm::style::Color::DarkRed,
        Color::Green => termimad::crossterm::style::Color::Green,
        Color::DarkGreen => termimad::crossterm::style::Color::DarkGreen,
        Color::Yellow => termimad::crossterm::style::Color::Yellow,
        Color::DarkYellow => termimad::crossterm::style::Color::DarkYellow,
        Color::Blue => termimad::crossterm::style::Color::Blue,
        Color::DarkBlue => termimad::crossterm::style::Color::DarkBlue,
        Color::Magenta => termimad::crossterm::style::Color::Magenta,
        Color::DarkMagenta => termimad::crossterm::style::Color::DarkMagenta,
        Color::Cyan => termimad::crossterm::style::Color::Cyan,
        Color::DarkCyan => termimad::crossterm::style::Color::DarkCyan,
        Color::White => termimad::crossterm::style::Color::White,
        Color::Grey => termimad::crossterm::style::Color::Grey,
        _ => termimad::crossterm::style::Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_detection() {
        assert!(has_markdown_elements("## Title"));
        assert!(has_markdown_elements("use **bold**"));
        assert!(!has_markdown_elements("plain reply"));
    }
}
