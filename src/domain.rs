//! Domain types for journaling sessions
//!
//! Sessions, summaries, entries, AI questions, and the user-model snapshot
//! sent along with AI pipeline requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// Prefix used in the text form of locally generated session identifiers
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Headline of the summary substituted for an unreadable summary blob
pub const UNAVAILABLE_SUMMARY_HEADLINE: &str = "Summary unavailable";

static LAST_LOCAL_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Identifier of a journal session, tagged with its provenance
///
/// Remote identifiers are issued by the row store. Local identifiers are
/// minted for fallback records that only exist in memory. The two never
/// compare equal, so a fallback record can never shadow a confirmed one.
///
/// # Examples
///
/// ```
/// use dayjot::domain::SessionId;
///
/// let remote: SessionId = "9b2f0c1e-1111-2222-3333-444455556666".parse().unwrap();
/// assert!(remote.is_remote());
///
/// let local: SessionId = "local-1700000000000".parse().unwrap();
/// assert_eq!(local, SessionId::Local(1_700_000_000_000));
/// assert_eq!(local.to_string(), "local-1700000000000");
/// ```
///
/// The serialized form carries the provenance as a tag
/// (`{"kind":"remote","value":"..."}`), so it round-trips exactly. The
/// display form is for people and row-store keys only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SessionId {
    /// Identifier assigned by the remote store
    Remote(String),
    /// In-memory fallback identifier (milliseconds since the Unix epoch)
    Local(i64),
}

impl SessionId {
    /// Creates a remote identifier
    pub fn remote(id: impl Into<String>) -> Self {
        SessionId::Remote(id.into())
    }

    /// Mints a fresh local identifier from the current time
    ///
    /// Successive calls within one process are strictly increasing, even
    /// when they land in the same millisecond.
    pub fn new_local() -> Self {
        let now = Utc::now().timestamp_millis();
        let mut last = LAST_LOCAL_MILLIS.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_LOCAL_MILLIS.compare_exchange_weak(
                last,
                next,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return SessionId::Local(next),
                Err(actual) => last = actual,
            }
        }
    }

    /// Returns `true` for identifiers issued by the remote store
    pub fn is_remote(&self) -> bool {
        matches!(self, SessionId::Remote(_))
    }

    /// Returns `true` for in-memory fallback identifiers
    pub fn is_local(&self) -> bool {
        matches!(self, SessionId::Local(_))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionId::Remote(id) => write!(f, "{}", id),
            SessionId::Local(millis) => write!(f, "{}{}", LOCAL_ID_PREFIX, millis),
        }
    }
}

/// Parses the display form
///
/// The display form is lossy: a remote id shaped like `local-<digits>`
/// parses as a local id. Use the serialized form to move ids between
/// processes.
impl FromStr for SessionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix(LOCAL_ID_PREFIX) {
            if let Ok(millis) = rest.parse::<i64>() {
                return Ok(SessionId::Local(millis));
            }
        }
        Ok(SessionId::Remote(s.to_string()))
    }
}

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Still being written
    Draft,
    /// Finished and summarized
    #[default]
    Completed,
}

impl SessionStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Draft => "draft",
            SessionStatus::Completed => "completed",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SessionStatus::Draft),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("unknown session status: {}", other)),
        }
    }
}

/// How the session was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Typed entry
    #[default]
    Text,
    /// Dictated entry
    Voice,
}

impl CaptureMode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Text => "text",
            CaptureMode::Voice => "voice",
        }
    }
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(CaptureMode::Text),
            "voice" => Ok(CaptureMode::Voice),
            other => Err(format!("unknown capture mode: {}", other)),
        }
    }
}

/// Short headline plus bullets describing one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// One-line headline
    pub headline: String,
    /// Ordered bullet points
    #[serde(default)]
    pub bullets: Vec<String>,
    /// Optional signal tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<Vec<String>>,
}

impl DailySummary {
    /// Creates a summary without signal tags
    pub fn new(headline: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            headline: headline.into(),
            bullets,
            signals: None,
        }
    }

    /// Summary substituted when a stored summary blob cannot be parsed
    pub fn unavailable() -> Self {
        Self::new(UNAVAILABLE_SUMMARY_HEADLINE, Vec::new())
    }

    /// Summary used by the fallback path when nothing was extracted
    pub fn fallback_default() -> Self {
        Self::new("Session", Vec::new())
    }

    /// Parses a stored summary blob, degrading to [`DailySummary::unavailable`]
    ///
    /// # Examples
    ///
    /// ```
    /// use dayjot::domain::DailySummary;
    ///
    /// let ok = DailySummary::from_blob(r#"{"headline":"Calm","bullets":["walk"]}"#);
    /// assert_eq!(ok.headline, "Calm");
    ///
    /// let bad = DailySummary::from_blob("{not json");
    /// assert_eq!(bad, DailySummary::unavailable());
    /// ```
    pub fn from_blob(blob: &str) -> Self {
        match serde_json::from_str(blob) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("Unreadable summary blob, using placeholder: {}", e);
                Self::unavailable()
            }
        }
    }
}

/// A completed or in-progress journaling session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalSession {
    /// Provenance-tagged identifier
    pub id: SessionId,
    /// Owning user
    pub user_id: String,
    /// Start of the session
    pub started_at: DateTime<Utc>,
    /// End of the session, if finished
    pub ended_at: Option<DateTime<Utc>>,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Capture mode
    pub mode: CaptureMode,
    /// Optional display title
    pub title: Option<String>,
    /// Optional summary
    pub summary: Option<DailySummary>,
}

impl JournalSession {
    /// Builds the in-memory record used when remote persistence fails
    ///
    /// The record gets a fresh local identifier, `completed` status, and
    /// identical start and end timestamps.
    pub fn fallback(user_id: impl Into<String>, summary: DailySummary) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new_local(),
            user_id: user_id.into(),
            started_at: now,
            ended_at: Some(now),
            status: SessionStatus::Completed,
            mode: CaptureMode::Text,
            title: Some(summary.headline.clone()),
            summary: Some(summary),
        }
    }

    /// Title to display, falling back to a generic label
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Session")
    }
}

/// Who wrote an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Written by the user
    User,
    /// Generated by the AI pipeline
    Ai,
}

impl EntrySource {
    /// Wire name of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::User => "user",
            EntrySource::Ai => "ai",
        }
    }
}

/// One piece of text attached to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub source: EntrySource,
}

/// A follow-up question suggested to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiQuestion {
    /// Question text
    pub question: String,
    /// Which area of the day the question covers
    pub coverage_tag: String,
    /// Why the question was picked now
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_this_now: Option<String>,
}

impl AiQuestion {
    /// Creates a question without a rationale
    pub fn new(question: impl Into<String>, coverage_tag: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            coverage_tag: coverage_tag.into(),
            why_this_now: None,
        }
    }
}

/// Low / medium / high calibration level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Stable facts about the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Vec<String>>,
}

/// Current state of the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<String>,
}

/// Patterns observed across sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MePatterns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emerging: Option<Vec<String>>,
}

/// How forward and how sensitive the assistant should be
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustCalibration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proactivity: Option<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Level>,
}

/// Snapshot of the derived user model sent with every pipeline request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeDbSnapshot {
    #[serde(default)]
    pub profile: MeProfile,
    #[serde(default)]
    pub state: MeState,
    #[serde(default)]
    pub patterns: MePatterns,
    #[serde(default)]
    pub trust: TrustCalibration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ids_are_strictly_increasing() {
        let a = SessionId::new_local();
        let b = SessionId::new_local();
        let c = SessionId::new_local();
        match (a, b, c) {
            (SessionId::Local(a), SessionId::Local(b), SessionId::Local(c)) => {
                assert!(a < b);
                assert!(b < c);
            }
            other => panic!("expected local ids, got {:?}", other),
        }
    }

    #[test]
    fn test_local_and_remote_never_equal() {
        let local = SessionId::Local(42);
        let remote = SessionId::remote("local-42");
        assert_ne!(local, remote);
    }

    #[test]
    fn test_session_id_parse_non_numeric_local_prefix_is_remote() {
        let id: SessionId = "local-abc".parse().unwrap();
        assert_eq!(id, SessionId::remote("local-abc"));
    }

    #[test]
    fn test_session_id_serializes_provenance() {
        let json = serde_json::to_value(SessionId::Local(5)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "local", "value": 5}));

        let lookalike = SessionId::remote("local-42");
        let text = serde_json::to_string(&lookalike).unwrap();
        let back: SessionId = serde_json::from_str(&text).unwrap();
        assert_eq!(back, lookalike);
    }

    #[test]
    fn test_fallback_session_shape() {
        let summary = DailySummary::new("Quiet day", vec!["read".to_string()]);
        let session = JournalSession::fallback("user-1", summary.clone());
        assert!(session.id.is_local());
        assert!(session.id.to_string().starts_with(LOCAL_ID_PREFIX));
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.mode, CaptureMode::Text);
        assert_eq!(session.ended_at, Some(session.started_at));
        assert_eq!(session.title.as_deref(), Some("Quiet day"));
        assert_eq!(session.summary, Some(summary));
    }

    #[test]
    fn test_summary_from_blob_missing_bullets_defaults_empty() {
        let summary = DailySummary::from_blob(r#"{"headline":"Only headline"}"#);
        assert_eq!(summary.headline, "Only headline");
        assert!(summary.bullets.is_empty());
    }

    #[test]
    fn test_summary_from_blob_wrong_shape_is_placeholder() {
        let summary = DailySummary::from_blob(r#"["not","an","object"]"#);
        assert_eq!(summary.headline, UNAVAILABLE_SUMMARY_HEADLINE);
        assert!(summary.bullets.is_empty());
    }

    #[test]
    fn test_status_and_mode_parse() {
        assert_eq!("draft".parse::<SessionStatus>(), Ok(SessionStatus::Draft));
        assert_eq!("voice".parse::<CaptureMode>(), Ok(CaptureMode::Voice));
        assert!("archived".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn test_ai_question_camel_case() {
        let q: AiQuestion = serde_json::from_str(
            r#"{"question":"Why?","coverageTag":"meaning","whyThisNow":"because"}"#,
        )
        .unwrap();
        assert_eq!(q.coverage_tag, "meaning");
        assert_eq!(q.why_this_now.as_deref(), Some("because"));
    }

    #[test]
    fn test_empty_snapshot_serializes_to_empty_objects() {
        let json = serde_json::to_value(MeDbSnapshot::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"profile": {}, "state": {}, "patterns": {}, "trust": {}})
        );
    }
}
