//! PostgREST row store
//!
//! Talks to the project's `journal_sessions`, `journal_entries`, and
//! `daily_summaries` tables over HTTP. PostgREST offers no transaction across
//! separate inserts, so a save that fails on the entry or summary insert
//! leaves the earlier rows in place. Callers treat any failure as a failed
//! save and fall back locally.

use crate::domain::{CaptureMode, DailySummary, EntrySource, JournalSession, SessionStatus};
use crate::error::{JournalError, Result};
use crate::store::types::{NewEntryRow, NewSessionRow, NewSummaryRow, SessionRow, SummaryRow};
use crate::store::RemoteStore;
use crate::supabase::{error_for_status, SupabaseClient};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use std::collections::HashMap;

const SESSIONS_TABLE: &str = "journal_sessions";
const ENTRIES_TABLE: &str = "journal_entries";
const SUMMARIES_TABLE: &str = "daily_summaries";
const SESSION_COLUMNS: &str = "id,user_id,started_at,ended_at,status,mode,title";

/// Row store backed by the hosted project's REST interface
pub struct SupabaseStore {
    client: SupabaseClient,
}

impl SupabaseStore {
    /// Create a store using the shared project client
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn insert_session(&self, row: &NewSessionRow<'_>) -> Result<SessionRow> {
        let response = self
            .client
            .request(Method::POST, &self.client.rest_url(SESSIONS_TABLE))
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(row)
            .send()
            .await
            .map_err(|e| JournalError::Persistence(format!("session insert failed: {}", e)))?;

        let response = error_for_status(response)
            .await
            .map_err(|e| JournalError::Persistence(format!("session insert rejected: {}", e)))?;

        let row = response.json::<SessionRow>().await.map_err(|e| {
            JournalError::Persistence(format!("unreadable session insert response: {}", e))
        })?;
        Ok(row)
    }

    async fn insert_minimal<T: serde::Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<()> {
        let response = self
            .client
            .request(Method::POST, &self.client.rest_url(table))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| JournalError::Persistence(format!("{} insert failed: {}", table, e)))?;

        error_for_status(response)
            .await
            .map_err(|e| JournalError::Persistence(format!("{} insert rejected: {}", table, e)))?;
        Ok(())
    }

    async fn fetch_summaries(&self, session_ids: &[&str]) -> Result<HashMap<String, DailySummary>> {
        let quoted: Vec<String> = session_ids.iter().map(|id| format!("\"{}\"", id)).collect();
        let filter = format!("in.({})", quoted.join(","));

        let response = self
            .client
            .request(Method::GET, &self.client.rest_url(SUMMARIES_TABLE))
            .query(&[("select", "session_id,summary_json"), ("session_id", filter.as_str())])
            .send()
            .await
            .map_err(|e| JournalError::Fetch(format!("summary query failed: {}", e)))?;

        let response = error_for_status(response)
            .await
            .map_err(|e| JournalError::Fetch(format!("summary query rejected: {}", e)))?;

        let rows: Vec<SummaryRow> = response
            .json()
            .await
            .map_err(|e| JournalError::Fetch(format!("unreadable summary rows: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let summary = row.decode();
                (row.session_id, summary)
            })
            .collect())
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn save_completed_session(
        &self,
        user_id: &str,
        draft_text: &str,
        summary: &DailySummary,
    ) -> Result<JournalSession> {
        let timestamp = Utc::now();

        let session_row = self
            .insert_session(&NewSessionRow {
                user_id,
                started_at: timestamp,
                ended_at: Some(timestamp),
                status: SessionStatus::Completed,
                mode: CaptureMode::Text,
                title: Some(summary.headline.as_str()),
            })
            .await?;

        tracing::debug!(session_id = %session_row.id, "Inserted session row");

        self.insert_minimal(
            ENTRIES_TABLE,
            &NewEntryRow {
                session_id: &session_row.id,
                created_at: timestamp,
                text: draft_text,
                source: EntrySource::User.as_str(),
            },
        )
        .await?;

        let summary_json = serde_json::to_string(summary)
            .map_err(|e| JournalError::Persistence(format!("unserializable summary: {}", e)))?;

        self.insert_minimal(
            SUMMARIES_TABLE,
            &NewSummaryRow {
                session_id: &session_row.id,
                created_at: timestamp,
                summary_json,
            },
        )
        .await?;

        tracing::info!(session_id = %session_row.id, "Saved completed session");
        Ok(session_row.into_session(Some(summary.clone())))
    }

    async fn fetch_recent_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<JournalSession>> {
        let user_filter = format!("eq.{}", user_id);
        let limit = limit.to_string();

        let response = self
            .client
            .request(Method::GET, &self.client.rest_url(SESSIONS_TABLE))
            .query(&[
                ("select", SESSION_COLUMNS),
                ("user_id", user_filter.as_str()),
                ("order", "started_at.desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| JournalError::Fetch(format!("session query failed: {}", e)))?;

        let response = error_for_status(response)
            .await
            .map_err(|e| JournalError::Fetch(format!("session query rejected: {}", e)))?;

        let rows: Vec<SessionRow> = response
            .json()
            .await
            .map_err(|e| JournalError::Fetch(format!("unreadable session rows: {}", e)))?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        let mut summaries = self.fetch_summaries(&ids).await?;

        tracing::debug!(
            sessions = rows.len(),
            summaries = summaries.len(),
            "Fetched recent sessions"
        );

        Ok(rows
            .into_iter()
            .map(|row| {
                let summary = summaries.remove(&row.id);
                row.into_session(summary)
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}
