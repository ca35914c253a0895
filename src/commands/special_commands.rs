//! Special commands parser for the interactive journaling loop
//!
//! Lines starting with `/` control the session instead of being added to the
//! draft. Commands are case-insensitive.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Commands available inside `dayjot journal`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Ask for a follow-up question about the draft
    Question,

    /// Summarize and save the draft
    Complete,

    /// Show reconciled history
    History,

    /// Print the current draft
    ShowDraft,

    /// Discard the draft and asked questions
    Clear,

    /// Display help information
    Help,

    /// Leave the loop
    Exit,

    /// Not a command; the line is draft text
    None,
}

/// Parse one input line
///
/// `exit` and `quit` work without the slash.
///
/// # Examples
///
/// ```
/// use dayjot::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/Complete").unwrap(), SpecialCommand::Complete);
/// assert_eq!(parse_special_command("Walked the dog.").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/dance").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/question" | "/q" => Ok(SpecialCommand::Question),
        "/complete" | "/done" => Ok(SpecialCommand::Complete),
        "/history" => Ok(SpecialCommand::History),
        "/draft" => Ok(SpecialCommand::ShowDraft),
        "/clear" => Ok(SpecialCommand::Clear),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/quit" | "/exit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the command reference
pub fn print_help() {
    println!(
        r#"
Journaling Commands
===================

  <text>      - Add a line to the draft
  /question   - Suggest a follow-up question (/q)
  /complete   - Summarize and save the draft (/done)
  /history    - Show recent sessions
  /draft      - Show the current draft
  /clear      - Discard the draft and questions
  /help       - Show this help
  /quit       - Leave (exit, quit)
"#
    );
}
