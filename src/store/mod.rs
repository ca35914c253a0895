//! Remote store adapters
//!
//! The row store is the system of record for completed sessions. Each save
//! writes three related rows (session, user entry, serialized summary) and
//! each history read returns recent sessions with their summaries.

use crate::config::{Config, StoreBackend};
use crate::domain::{DailySummary, JournalSession};
use crate::error::Result;
use crate::supabase::SupabaseClient;
use async_trait::async_trait;
use std::sync::Arc;

pub mod sqlite;
pub mod supabase;
pub mod types;

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;
pub use types::{SessionRow, SummaryRow};

/// Persistence boundary for completed journal sessions
///
/// Implementations must use one timestamp for the session start and end,
/// the entry, and the summary row, and must reference the same new session
/// id from all three rows.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Persist a completed session and return the hydrated record
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JournalError::Persistence`] if any of the
    /// three writes fails.
    async fn save_completed_session(
        &self,
        user_id: &str,
        draft_text: &str,
        summary: &DailySummary,
    ) -> Result<JournalSession>;

    /// Fetch up to `limit` sessions of a user, most recent first
    ///
    /// A user with no sessions yields an empty vector. Summaries that cannot
    /// be decoded are replaced by a placeholder for that session only.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JournalError::Fetch`] if a query fails.
    async fn fetch_recent_sessions(&self, user_id: &str, limit: usize)
        -> Result<Vec<JournalSession>>;

    /// Short backend name for logs and status output
    fn name(&self) -> &'static str;
}

/// Create the configured row store
///
/// # Errors
///
/// Returns error if the SQLite database cannot be opened
pub fn create_store(config: &Config, client: &SupabaseClient) -> Result<Arc<dyn RemoteStore>> {
    match config.store.backend {
        StoreBackend::Supabase => Ok(Arc::new(SupabaseStore::new(client.clone()))),
        StoreBackend::Sqlite => {
            let store = match &config.store.sqlite_path {
                Some(path) => SqliteStore::new_with_path(path)?,
                None => SqliteStore::new()?,
            };
            Ok(Arc::new(store))
        }
    }
}
