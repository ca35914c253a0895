//! In-process cache of sessions created during this run
//!
//! Holds canonical records returned by successful saves and fallback records
//! for saves that never reached the remote store. Nothing here survives a
//! process restart.

use crate::domain::{JournalSession, SessionId};

/// Newest-first list of sessions owned by the running process
///
/// No deduplication happens at this layer; [`crate::reconcile::merge`]
/// resolves overlaps with the remote list at read time.
///
/// # Examples
///
/// ```
/// use dayjot::cache::LocalSessionCache;
/// use dayjot::domain::{DailySummary, JournalSession};
///
/// let mut cache = LocalSessionCache::new();
/// cache.add_session(JournalSession::fallback("u1", DailySummary::fallback_default()));
/// assert_eq!(cache.len(), 1);
/// cache.clear_sessions();
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalSessionCache {
    sessions: Vec<JournalSession>,
}

impl LocalSessionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a session so the list stays newest-first
    pub fn add_session(&mut self, session: JournalSession) {
        tracing::debug!(session_id = %session.id, "Caching session locally");
        self.sessions.insert(0, session);
    }

    /// Drop every cached session
    pub fn clear_sessions(&mut self) {
        self.sessions.clear();
    }

    /// Cached sessions, newest first
    pub fn sessions(&self) -> &[JournalSession] {
        &self.sessions
    }

    /// Look up a cached session by identifier
    pub fn get(&self, id: &SessionId) -> Option<&JournalSession> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    /// Number of fallback records that only exist in memory
    pub fn local_only_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.id.is_local()).count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::session_with_id;

    #[test]
    fn test_add_session_prepends() {
        let mut cache = LocalSessionCache::new();
        cache.add_session(session_with_id("first", 0));
        cache.add_session(session_with_id("second", 1));

        let ids: Vec<String> = cache.sessions().iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[test]
    fn test_add_session_does_not_deduplicate() {
        let mut cache = LocalSessionCache::new();
        cache.add_session(session_with_id("same", 0));
        cache.add_session(session_with_id("same", 1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear_sessions_empties_cache() {
        let mut cache = LocalSessionCache::new();
        cache.add_session(session_with_id("a", 0));
        cache.clear_sessions();
        assert!(cache.is_empty());
        assert!(cache.sessions().is_empty());
    }

    #[test]
    fn test_get_and_local_only_count() {
        let mut cache = LocalSessionCache::new();
        cache.add_session(session_with_id("remote-1", 0));
        let fallback = JournalSession::fallback(
            "user-1",
            crate::domain::DailySummary::fallback_default(),
        );
        let fallback_id = fallback.id.clone();
        cache.add_session(fallback);

        assert_eq!(cache.local_only_count(), 1);
        assert!(cache.get(&fallback_id).is_some());
        assert!(cache.get(&SessionId::remote("missing")).is_none());
    }
}
