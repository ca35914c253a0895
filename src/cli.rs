//! Command-line interface definition for Dayjot
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for journaling, history, authentication, and settings.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dayjot - daily journaling with AI summaries
///
/// Write a short entry, get follow-up questions, and keep a history of
/// summarized sessions.
#[derive(Parser, Debug, Clone)]
#[command(name = "dayjot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Dayjot
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive journaling session
    Journal,

    /// Save an entry in one step
    Complete {
        /// Entry text
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the entry from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show recent sessions
    History {
        /// Maximum number of remote sessions to fetch
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Suggest a follow-up question for a draft
    Question {
        /// Draft text
        #[arg(short, long)]
        text: String,
    },

    /// Manage the signed-in account
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Account subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DAYJOT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DAYJOT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Status,
}

/// Preference subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print current preferences
    Show,

    /// Switch between local mock AI and the hosted pipeline
    ToggleMockAi,

    /// Mark onboarding as done
    CompleteOnboarding,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Journal,
        }
    }
}
