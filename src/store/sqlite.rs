use crate::domain::{
    CaptureMode, DailySummary, EntrySource, JournalSession, SessionId, SessionStatus,
};
use crate::error::{JournalError, Result};
use crate::store::RemoteStore;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

type StoreResult<T> = std::result::Result<T, JournalError>;

/// Row store backed by a local SQLite file
///
/// Uses the same three tables as the hosted project. Unlike the REST store,
/// a save runs inside one transaction: if any insert fails nothing is
/// written. Database work runs on the blocking pool so a locked file never
/// stalls the async runtime.
pub struct SqliteStore {
    db_path: PathBuf,
}

/// Format timestamps with fixed precision so text ordering matches time ordering
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `journal_sessions` columns as stored, before validation
struct StoredSession {
    id: String,
    user_id: String,
    started_at: String,
    ended_at: Option<String>,
    status: String,
    mode: String,
    title: Option<String>,
}

impl StoredSession {
    /// Convert to a domain session
    ///
    /// A row without a readable start time is skipped, since it cannot be
    /// placed in history. Other unreadable columns fall back to defaults.
    /// Each case is logged with the row id.
    fn into_session(self) -> Option<JournalSession> {
        let Some(started_at) = parse_timestamp(&self.started_at) else {
            tracing::warn!(
                session_id = %self.id,
                "Skipping session with unreadable started_at {:?}",
                self.started_at
            );
            return None;
        };

        let ended_at = self.ended_at.as_deref().and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                tracing::warn!(session_id = %self.id, "Ignoring unreadable ended_at {:?}", raw);
            }
            parsed
        });

        let status = self.status.parse().unwrap_or_else(|e| {
            tracing::warn!(session_id = %self.id, "{}; assuming completed", e);
            SessionStatus::default()
        });
        let mode = self.mode.parse().unwrap_or_else(|e| {
            tracing::warn!(session_id = %self.id, "{}; assuming text", e);
            CaptureMode::default()
        });

        Some(JournalSession {
            id: SessionId::Remote(self.id),
            user_id: self.user_id,
            started_at,
            ended_at,
            status,
            mode,
            title: self.title,
            summary: None,
        })
    }
}

fn init_schema(db_path: &Path) -> StoreResult<()> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS journal_sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT,
            status TEXT NOT NULL,
            mode TEXT NOT NULL,
            title TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user_started
            ON journal_sessions (user_id, started_at DESC);
        CREATE TABLE IF NOT EXISTS journal_entries (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES journal_sessions(id),
            created_at TEXT NOT NULL,
            text TEXT NOT NULL,
            source TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS daily_summaries (
            session_id TEXT PRIMARY KEY REFERENCES journal_sessions(id),
            created_at TEXT NOT NULL,
            summary_json TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn save_session(
    db_path: &Path,
    user_id: &str,
    draft_text: &str,
    summary: &DailySummary,
) -> StoreResult<JournalSession> {
    let mut conn = Connection::open(db_path)?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let entry_id = uuid::Uuid::new_v4().to_string();
    let stamp = format_timestamp(Utc::now());
    let summary_json = serde_json::to_string(summary)?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO journal_sessions (id, user_id, started_at, ended_at, status, mode, title)
        VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            session_id,
            user_id,
            stamp,
            stamp,
            SessionStatus::Completed.as_str(),
            CaptureMode::Text.as_str(),
            summary.headline
        ],
    )?;
    tx.execute(
        "INSERT INTO journal_entries (id, session_id, created_at, text, source)
        VALUES (?, ?, ?, ?, ?)",
        params![entry_id, session_id, stamp, draft_text, EntrySource::User.as_str()],
    )?;
    tx.execute(
        "INSERT INTO daily_summaries (session_id, created_at, summary_json) VALUES (?, ?, ?)",
        params![session_id, stamp, summary_json],
    )?;
    tx.commit()?;

    // Read back through the same text form the fetch path uses.
    let stored_at = parse_timestamp(&stamp).unwrap_or_else(Utc::now);
    Ok(JournalSession {
        id: SessionId::Remote(session_id),
        user_id: user_id.to_string(),
        started_at: stored_at,
        ended_at: Some(stored_at),
        status: SessionStatus::Completed,
        mode: CaptureMode::Text,
        title: Some(summary.headline.clone()),
        summary: Some(summary.clone()),
    })
}

fn fetch_sessions(db_path: &Path, user_id: &str, limit: usize) -> StoreResult<Vec<JournalSession>> {
    let conn = Connection::open(db_path)?;

    let mut stmt = conn.prepare(
        "SELECT id, user_id, started_at, ended_at, status, mode, title
        FROM journal_sessions
        WHERE user_id = ?
        ORDER BY started_at DESC
        LIMIT ?",
    )?;
    let rows = stmt.query_map(params![user_id, limit as i64], |row| {
        Ok(StoredSession {
            id: row.get(0)?,
            user_id: row.get(1)?,
            started_at: row.get(2)?,
            ended_at: row.get(3)?,
            status: row.get(4)?,
            mode: row.get(5)?,
            title: row.get(6)?,
        })
    })?;

    let mut sessions = Vec::new();
    for row in rows {
        if let Some(session) = row?.into_session() {
            sessions.push(session);
        }
    }

    if sessions.is_empty() {
        return Ok(sessions);
    }

    let ids: Vec<String> = sessions.iter().map(|s| s.id.to_string()).collect();
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT session_id, summary_json FROM daily_summaries WHERE session_id IN ({})",
        placeholders
    );

    let mut stmt = conn.prepare(&sql)?;
    let summary_rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut summaries: HashMap<String, DailySummary> = HashMap::new();
    for row in summary_rows {
        let (session_id, blob) = row?;
        summaries.insert(session_id, DailySummary::from_blob(&blob));
    }

    for session in &mut sessions {
        session.summary = summaries.remove(&session.id.to_string());
    }

    Ok(sessions)
}

impl SqliteStore {
    /// Create a store in the user's data directory
    ///
    /// The `DAYJOT_DB` environment variable overrides the location.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("DAYJOT_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "dayjot", "dayjot")
            .ok_or_else(|| JournalError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("journal.db"))
    }

    /// Create a store that uses the specified database path
    ///
    /// # Examples
    ///
    /// ```
    /// use dayjot::store::SqliteStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteStore::new_with_path(dir.path().join("journal.db")).unwrap();
    /// assert!(store.db_path().exists());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(JournalError::Io)?;
        }
        init_schema(&db_path)?;

        Ok(Self { db_path })
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn run_blocking<T, F>(&self, work: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> StoreResult<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || work(&db_path))
            .await
            .map_err(|e| JournalError::Storage(format!("database task failed: {}", e)))?
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn save_completed_session(
        &self,
        user_id: &str,
        draft_text: &str,
        summary: &DailySummary,
    ) -> Result<JournalSession> {
        let user_id = user_id.to_string();
        let draft_text = draft_text.to_string();
        let summary = summary.clone();

        let session = self
            .run_blocking(move |path| save_session(path, &user_id, &draft_text, &summary))
            .await
            .map_err(|e| JournalError::Persistence(e.to_string()))?;

        tracing::info!(session_id = %session.id, "Saved completed session to SQLite");
        Ok(session)
    }

    async fn fetch_recent_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<JournalSession>> {
        let user_id = user_id.to_string();

        let sessions = self
            .run_blocking(move |path| fetch_sessions(path, &user_id, limit))
            .await
            .map_err(|e| JournalError::Fetch(e.to_string()))?;

        tracing::debug!(count = sessions.len(), "Fetched recent sessions from SQLite");
        Ok(sessions)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
