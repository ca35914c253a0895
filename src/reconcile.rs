//! Session reconciliation
//!
//! Merges the authoritative remote session list with the sessions cached
//! during this run into one deduplicated view ordered by start time.

use crate::cache::LocalSessionCache;
use crate::domain::{JournalSession, SessionId};
use crate::store::RemoteStore;
use serde::Serialize;
use std::collections::HashSet;

/// Warning attached to history when the remote fetch failed
pub const OFFLINE_HISTORY_WARNING: &str =
    "Unable to reach the backend. Showing local history only.";

/// Merge remote and local sessions
///
/// Remote sessions win on identifier conflicts. Local sessions are kept only
/// when their identifier is absent from the remote list. The result is
/// sorted by `started_at`, most recent first; the sort is stable, so ties
/// keep remote records ahead of local ones.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use dayjot::domain::{CaptureMode, JournalSession, SessionId, SessionStatus};
/// use dayjot::reconcile::merge;
///
/// fn session(id: &str, title: &str, minute: u32) -> JournalSession {
///     let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap();
///     JournalSession {
///         id: SessionId::remote(id),
///         user_id: "u1".into(),
///         started_at: at,
///         ended_at: Some(at),
///         status: SessionStatus::Completed,
///         mode: CaptureMode::Text,
///         title: Some(title.into()),
///         summary: None,
///     }
/// }
///
/// let remote = vec![session("1", "confirmed", 5)];
/// let local = vec![session("1", "optimistic", 5), session("2", "offline", 1)];
/// let merged = merge(&remote, &local);
///
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0].title.as_deref(), Some("confirmed"));
/// assert_eq!(merged[1].id, SessionId::remote("2"));
/// ```
pub fn merge(remote: &[JournalSession], local: &[JournalSession]) -> Vec<JournalSession> {
    let mut seen: HashSet<&SessionId> = HashSet::with_capacity(remote.len() + local.len());
    let mut merged = Vec::with_capacity(remote.len() + local.len());

    for session in remote.iter().chain(local.iter()) {
        if seen.insert(&session.id) {
            merged.push(session.clone());
        }
    }

    merged.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    merged
}

/// Sessions ready for display, plus an optional soft warning
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryView {
    /// Merged sessions, most recent first
    pub sessions: Vec<JournalSession>,
    /// Set when the remote fetch failed and only local sessions are shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Build the history view for a user
///
/// Without a signed-in user only the local cache is shown. A failed remote
/// fetch is logged and degrades to local-only results with
/// [`OFFLINE_HISTORY_WARNING`]; it never fails the call.
pub async fn load_history(
    store: &dyn RemoteStore,
    user_id: Option<&str>,
    cache: &LocalSessionCache,
    limit: usize,
) -> HistoryView {
    let Some(user_id) = user_id else {
        tracing::debug!("No signed-in user; showing local history only");
        return HistoryView {
            sessions: merge(&[], cache.sessions()),
            warning: None,
        };
    };

    match store.fetch_recent_sessions(user_id, limit).await {
        Ok(remote) => {
            tracing::info!(
                remote = remote.len(),
                local = cache.len(),
                "Reconciling session history"
            );
            HistoryView {
                sessions: merge(&remote, cache.sessions()),
                warning: None,
            }
        }
        Err(e) => {
            tracing::warn!("Failed to fetch remote sessions: {:#}", e);
            HistoryView {
                sessions: merge(&[], cache.sessions()),
                warning: Some(OFFLINE_HISTORY_WARNING.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{session_with_id, FakeStore};

    fn ids(sessions: &[JournalSession]) -> Vec<String> {
        sessions.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_merge_remote_wins_on_conflict() {
        let mut remote_one = session_with_id("1", 10);
        remote_one.title = Some("remote".to_string());
        let mut local_one = session_with_id("1", 10);
        local_one.title = Some("local".to_string());
        let local_two = session_with_id("2", 5);

        let merged = merge(&[remote_one], &[local_one, local_two]);
        assert_eq!(ids(&merged), vec!["1", "2"]);
        assert_eq!(merged[0].title.as_deref(), Some("remote"));
    }

    #[test]
    fn test_merge_size_is_union_by_id() {
        let remote = vec![session_with_id("a", 1), session_with_id("b", 2)];
        let local = vec![
            session_with_id("b", 2),
            session_with_id("c", 3),
            session_with_id("d", 4),
        ];
        let merged = merge(&remote, &local);
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_merge_sorts_by_start_time_descending() {
        let remote = vec![session_with_id("old-remote", 1)];
        let local = vec![session_with_id("new-local", 30), session_with_id("mid", 15)];
        let merged = merge(&remote, &local);
        assert_eq!(ids(&merged), vec!["new-local", "mid", "old-remote"]);
    }

    #[test]
    fn test_merge_tie_keeps_remote_first() {
        let remote = vec![session_with_id("r", 7)];
        let local = vec![session_with_id("l", 7)];
        let merged = merge(&remote, &local);
        assert_eq!(ids(&merged), vec!["r", "l"]);
    }

    #[test]
    fn test_merge_empty_inputs() {
        assert!(merge(&[], &[]).is_empty());
    }

    #[tokio::test]
    async fn test_load_history_without_user_is_local_only() {
        let store = FakeStore::succeeding("unused");
        let mut cache = LocalSessionCache::new();
        cache.add_session(session_with_id("l", 1));

        let view = load_history(&store, None, &cache, 20).await;
        assert_eq!(ids(&view.sessions), vec!["l"]);
        assert!(view.warning.is_none());
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_history_fetch_failure_degrades_with_warning() {
        let store = FakeStore::failing();
        let mut cache = LocalSessionCache::new();
        cache.add_session(session_with_id("l", 1));

        let view = load_history(&store, Some("user-1"), &cache, 20).await;
        assert_eq!(ids(&view.sessions), vec!["l"]);
        assert_eq!(view.warning.as_deref(), Some(OFFLINE_HISTORY_WARNING));
    }

    #[tokio::test]
    async fn test_load_history_merges_remote_and_local() {
        let store = FakeStore::succeeding("unused").with_remote(vec![session_with_id("r", 9)]);
        let mut cache = LocalSessionCache::new();
        cache.add_session(session_with_id("r", 9));
        cache.add_session(session_with_id("l", 12));

        let view = load_history(&store, Some("user-1"), &cache, 20).await;
        assert_eq!(ids(&view.sessions), vec!["l", "r"]);
        assert!(view.warning.is_none());
        assert_eq!(store.fetch_calls(), 1);
    }
}
