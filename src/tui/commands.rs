//! Slash command parsing and definitions

use crossterm::style::Stylize;

/// Available slash commands
#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Models,
    Model(Option<String>),
    Key(Option<String>),
    Lang(Option<String>),
    Copy,
    Save(Option<String>),
    Status,
    Stats,
    History,
    Unknown(String),
}

/// Parse a slash command from user input.
/// Returns None if the input is not a slash command.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match input.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, Some(rest.trim())),
        None => (input, None),
    };
    let arg = arg.filter(|a| !a.is_empty()).map(str::to_string);

    let command = match cmd.to_lowercase().as_str() {
        "/help" | "/h" | "/?" => SlashCommand::Help,
        "/quit" | "/q" | "/exit" => SlashCommand::Quit,
        "/models" | "/ls" => SlashCommand::Models,
        "/model" | "/m" => SlashCommand::Model(arg),
        "/key" => SlashCommand::Key(arg),
        "/lang" | "/language" => SlashCommand::Lang(arg),
        "/copy" => SlashCommand::Copy,
        "/save" => SlashCommand::Save(arg),
        "/status" => SlashCommand::Status,
        "/stats" => SlashCommand::Stats,
        "/history" => SlashCommand::History,
        other => SlashCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Render help text for all slash commands
pub fn render_help(renderer: &super::renderer::TerminalRenderer) {
    let cmd_color = renderer.command_color();
    let dim_color = renderer.dim_color();

    println!();
    renderer.render_system("Available commands:");
    println!();

    let commands = [
        ("/help", "Show this help message"),
        ("/quit", "Exit interactive mode"),
        ("/models", "List the available models"),
        ("/model [id]", "Show or change the selected model"),
        ("/key [value]", "Set the OpenRouter API key for this session"),
        ("/lang [language]", "Show or change the code language"),
        ("/copy", "Copy the last generated code to the clipboard"),
        ("/save [path]", "Save the last image or generated code"),
        ("/status", "Show model, key and request state"),
        ("/stats", "Show usage statistics"),
        ("/history", "Show the chat transcript"),
    ];

    for (cmd, desc) in &commands {
        println!("  {:<25} {}", cmd.with(cmd_color), desc.with(dim_color));
    }
    println!();
    renderer.render_info("Anything else is sent to the selected model.");
    println!();
}
