use crate::domain::{CaptureMode, DailySummary, JournalSession, SessionId, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session row as stored in `journal_sessions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub mode: CaptureMode,
    pub title: Option<String>,
}

impl SessionRow {
    /// Hydrate a domain session from the row and its (optional) summary
    pub fn into_session(self, summary: Option<DailySummary>) -> JournalSession {
        JournalSession {
            id: SessionId::Remote(self.id),
            user_id: self.user_id,
            started_at: self.started_at,
            ended_at: self.ended_at,
            status: self.status,
            mode: self.mode,
            title: self.title,
            summary,
        }
    }
}

/// Insert payload for `journal_sessions`; the store assigns the id
#[derive(Debug, Clone, Serialize)]
pub struct NewSessionRow<'a> {
    pub user_id: &'a str,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub mode: CaptureMode,
    pub title: Option<&'a str>,
}

/// Insert payload for `journal_entries`
#[derive(Debug, Clone, Serialize)]
pub struct NewEntryRow<'a> {
    pub session_id: &'a str,
    pub created_at: DateTime<Utc>,
    pub text: &'a str,
    pub source: &'static str,
}

/// Insert payload for `daily_summaries`
#[derive(Debug, Clone, Serialize)]
pub struct NewSummaryRow<'a> {
    pub session_id: &'a str,
    pub created_at: DateTime<Utc>,
    pub summary_json: String,
}

/// Summary row as read back from `daily_summaries`
///
/// `summary_json` is kept as a raw JSON value because the column may be text
/// holding serialized JSON or a native JSON column.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRow {
    pub session_id: String,
    pub summary_json: serde_json::Value,
}

impl SummaryRow {
    /// Decode the stored summary, degrading to the placeholder on bad content
    pub fn decode(&self) -> DailySummary {
        match &self.summary_json {
            serde_json::Value::String(blob) => DailySummary::from_blob(blob),
            other => serde_json::from_value(other.clone()).unwrap_or_else(|e| {
                tracing::warn!(
                    session_id = %self.session_id,
                    "Unreadable summary, using placeholder: {}",
                    e
                );
                DailySummary::unavailable()
            }),
        }
    }
}
