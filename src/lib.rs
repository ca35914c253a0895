//! Dayjot - daily journaling with AI summaries
//!
//! The core of a journaling app: a row store adapter for completed
//! sessions, an in-memory cache of sessions created during the run, a
//! reconciliation step that merges the two for display, and a save flow that
//! falls back to a local record when the backend is unreachable.
//!
//! # Architecture
//!
//! - `store`: remote row store adapters (hosted REST and local SQLite)
//! - `cache`: sessions created during this run
//! - `reconcile`: merge of remote and local history
//! - `journal`: draft editing and the save/fallback flow
//! - `ai`: question engine, summary extractor, and pipeline gateway
//! - `auth`: session providers
//! - `app`: the context wiring these together
//!
//! # Example
//!
//! ```no_run
//! use dayjot::{AppContext, Config, JournalFlow};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut ctx = AppContext::from_config(Config::default()).await?;
//!     let mut flow = JournalFlow::new();
//!     flow.set_draft("Good day. Long walk after lunch.");
//!     let outcome = flow.complete(&mut ctx).await?;
//!     println!("{}", outcome.message());
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod app;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod journal;
pub mod reconcile;
pub mod settings;
pub mod store;
pub mod supabase;

// Re-export commonly used types
pub use app::AppContext;
pub use config::Config;
pub use domain::{DailySummary, JournalSession, SessionId};
pub use error::{JournalError, Result};
pub use journal::{CompletionOutcome, JournalFlow, SaveState};

#[cfg(test)]
pub mod test_utils;
