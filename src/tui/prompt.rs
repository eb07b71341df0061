//! Line input for the shell

use super::commands::{parse_command, SlashCommand};
use crossterm::style::{Color, Stylize};
use std::io::{self, BufRead, Write};

/// Reads user lines behind a prompt that shows the active category
pub struct PromptHandler {
    history: Vec<String>,
}

impl PromptHandler {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    /// Display the prompt and read a line of input.
    /// Returns None on EOF (Ctrl+D).
    pub fn read_line(&mut self, label: &str, color: Color) -> Option<String> {
        print!("{} {} ", label.with(color), ">".with(color));
        io::stdout().flush().ok()?;

        let trimmed = read_trimmed()?;
        self.record(&trimmed);
        Some(trimmed)
    }

    /// Read a value without recording it in the input history
    pub fn read_secret(&mut self, label: &str, color: Color) -> Option<String> {
        print!("{} ", label.with(color));
        io::stdout().flush().ok()?;
        read_trimmed()
    }

    /// Keep a line in history unless it is empty or carries an API key
    fn record(&mut self, line: &str) {
        if line.is_empty() || matches!(parse_command(line), Some(SlashCommand::Key(_))) {
            return;
        }
        self.history.push(line.to_string());
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for PromptHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn read_trimmed() -> Option<String> {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_lines_never_enter_history() {
        let mut prompt = PromptHandler::new();
        prompt.record("/key sk-or-lower");
        prompt.record("/Key sk-or-mixed");
        prompt.record("/KEY sk-or-upper");
        prompt.record("");
        prompt.record("Hello");
        prompt.record("/model stable-diffusion-xl");

        assert_eq!(prompt.history_len(), 2);
        assert!(prompt.history.iter().all(|line| !line.contains("sk-or")));
    }
}
