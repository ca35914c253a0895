//! Command handlers for the Dayjot CLI
//!
//! Each subcommand of the binary maps to a handler here. Handlers receive an
//! [`AppContext`] built from the loaded configuration.

use crate::app::AppContext;
use crate::error::{JournalError, Result};
use crate::journal::{CompletionOutcome, JournalFlow};
use colored::Colorize;

pub mod history;
pub mod settings;
pub mod special_commands;

/// Print the result of a completion
fn print_outcome(outcome: &CompletionOutcome) {
    let session = outcome.session();
    match outcome {
        CompletionOutcome::Saved(_) => println!("{}", outcome.message().green()),
        CompletionOutcome::FallbackSaved { reason, .. } => {
            println!("{}", outcome.message().yellow());
            tracing::debug!("Fallback reason: {}", reason);
        }
    }

    if let Some(summary) = &session.summary {
        println!("\n  {}", summary.headline.bold());
        for bullet in &summary.bullets {
            println!("  - {}", bullet);
        }
        println!();
    }
}

/// User-facing text for errors the flow reports instead of recovering
///
/// Returns `None` for errors that are not user mistakes.
pub fn user_message(error: &anyhow::Error) -> Option<String> {
    match error.downcast_ref::<JournalError>()? {
        JournalError::Validation(msg)
        | JournalError::AuthenticationRequired(msg)
        | JournalError::Question(msg)
        | JournalError::Authentication(msg) => Some(msg.clone()),
        JournalError::SaveInProgress => Some("A save is already in progress.".to_string()),
        _ => None,
    }
}

pub mod journal {
    //! Interactive journaling loop
    //!
    //! Free text is appended to the draft; lines starting with `/` are
    //! commands (see [`special_commands`](super::special_commands)).

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    fn print_welcome_banner(ctx: &AppContext) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                 Dayjot - How was your day?                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        match ctx.current_user_id() {
            Some(user) => println!("Signed in as: {}", user.cyan()),
            None => println!(
                "{}",
                "Not signed in. Run `dayjot auth login` before completing an entry.".yellow()
            ),
        }
        let ai = if ctx.mock_ai() { "mock" } else { "pipeline" };
        println!("Storage: {}   AI: {}", ctx.store.name(), ai);
        if ctx.settings.settings().needs_onboarding {
            println!(
                "{}",
                "Write a few lines about your day, ask for a /question when stuck, then /complete."
                    .dimmed()
            );
        }
        println!("Type '/help' for available commands, '/quit' to leave\n");
    }

    /// Run the interactive loop until the user quits
    ///
    /// # Errors
    ///
    /// Returns error if the line editor cannot be created
    pub async fn run_journal(mut ctx: AppContext) -> Result<()> {
        tracing::info!("Starting interactive journaling session");

        let mut flow = JournalFlow::new();
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&ctx);

        loop {
            let prompt = if flow.draft().is_empty() {
                "dayjot> ".to_string()
            } else {
                format!("dayjot [{} chars]> ", flow.draft().chars().count())
            };

            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e);
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::None => flow.append_to_draft(trimmed),
                        SpecialCommand::Question => match flow.next_question(&ctx).await {
                            Ok(question) => println!("\n  {}\n", question.question.cyan()),
                            Err(e) => report(&e),
                        },
                        SpecialCommand::Complete => match flow.complete(&mut ctx).await {
                            Ok(outcome) => print_outcome(&outcome),
                            Err(e) => report(&e),
                        },
                        SpecialCommand::History => {
                            let view = ctx.history(ctx.config.store.history_limit).await;
                            history::print_history(&view);
                        }
                        SpecialCommand::ShowDraft => {
                            if flow.draft().is_empty() {
                                println!("{}", "(empty draft)".dimmed());
                            } else {
                                println!("\n{}\n", flow.draft());
                            }
                            if let Some(question) = flow.current_question() {
                                println!("Current question: {}\n", question.question.cyan());
                            }
                        }
                        SpecialCommand::Clear => {
                            flow.reset();
                            println!("{}", "Draft cleared.".dimmed());
                        }
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        for warning in exit_warnings(&flow, &ctx) {
            println!("{}", warning.yellow());
        }
        println!("Goodbye!");
        Ok(())
    }

    /// Warnings about work that is lost when the loop ends
    fn exit_warnings(flow: &JournalFlow, ctx: &AppContext) -> Vec<String> {
        let mut warnings = Vec::new();
        if !flow.draft().trim().is_empty() {
            warnings.push(format!(
                "Unsaved draft discarded ({} chars). Use /complete before leaving to keep it.",
                flow.draft().chars().count()
            ));
        }
        let unsaved = ctx.cache.local_only_count();
        if unsaved > 0 {
            warnings.push(format!(
                "{} session(s) were only saved in memory and will be lost.",
                unsaved
            ));
        }
        warnings
    }

    fn report(error: &anyhow::Error) {
        match user_message(error) {
            Some(msg) => eprintln!("{}\n", msg.yellow()),
            None => eprintln!("{}\n", format!("Error: {:#}", error).red()),
        }
    }

}

pub mod complete {
    //! One-shot entry commands

    use super::*;
    use std::path::PathBuf;

    /// Handle `dayjot complete`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the flow rejects the
    /// entry (blank text, no signed-in user). A failed remote save is
    /// reported as a local fallback, not an error.
    pub async fn run_complete(
        mut ctx: AppContext,
        text: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<()> {
        let text = match (text, file) {
            (Some(text), _) => text,
            (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| {
                JournalError::Validation(format!("Cannot read {}: {}", path.display(), e))
            })?,
            (None, None) => String::new(),
        };

        let mut flow = JournalFlow::new();
        flow.set_draft(text);
        let outcome = flow.complete(&mut ctx).await?;
        print_outcome(&outcome);
        Ok(())
    }

    /// Handle `dayjot question`
    pub async fn run_question(ctx: AppContext, text: String) -> Result<()> {
        let mut flow = JournalFlow::new();
        flow.set_draft(text);
        let question = flow.next_question(&ctx).await?;
        println!("{}", question.question);
        Ok(())
    }
}

pub mod auth {
    //! Account commands

    use super::*;
    use crate::auth::AuthProvider;
    use crate::cli::AuthCommand;

    /// Handle `dayjot auth`
    pub async fn handle_auth(auth: &dyn AuthProvider, command: AuthCommand) -> Result<()> {
        match command {
            AuthCommand::Login { email, password } => {
                let session = auth.sign_in(&email, &password).await?;
                println!(
                    "{} {}",
                    "Signed in as".green(),
                    session.user.email.as_deref().unwrap_or(&session.user.id)
                );
            }
            AuthCommand::Signup { email, password } => {
                match auth.sign_up(&email, &password).await? {
                    Some(session) => println!(
                        "{} {}",
                        "Account created. Signed in as".green(),
                        session.user.id
                    ),
                    None => println!(
                        "{}",
                        "Account created. Check your email to confirm it, then sign in.".yellow()
                    ),
                }
            }
            AuthCommand::Logout => {
                auth.sign_out().await?;
                println!("Signed out.");
            }
            AuthCommand::Status => match auth.current_session() {
                Some(session) => {
                    println!("Signed in as: {}", session.user.id.cyan());
                    if let Some(email) = &session.user.email {
                        println!("Email:        {}", email);
                    }
                    if let Some(expires_at) = session.expires_at {
                        println!(
                            "Expires:      {}",
                            expires_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
                        );
                    }
                }
                None => println!("{}", "Not signed in.".yellow()),
            },
        }
        Ok(())
    }

}
