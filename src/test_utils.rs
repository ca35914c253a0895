//! Test utilities for Dayjot
//!
//! In-memory fakes for the row store and the AI gateway, plus helpers for
//! building sessions and a fully wired [`AppContext`].

use crate::ai::{AiGateway, AiPipelineRequest, AiPipelineResponse};
use crate::app::AppContext;
use crate::auth::StaticAuth;
use crate::config::Config;
use crate::domain::{CaptureMode, DailySummary, JournalSession, SessionId, SessionStatus};
use crate::error::{JournalError, Result};
use crate::settings::SettingsStore;
use crate::store::RemoteStore;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Completed session with a remote id (or local id for `local-<n>`) that
/// started `minute_offset` minutes after a fixed base time
pub fn session_with_id(id: &str, minute_offset: i64) -> JournalSession {
    let base = Utc
        .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
        .single()
        .expect("valid base time");
    let started_at = base + Duration::minutes(minute_offset);
    JournalSession {
        id: id.parse().expect("session ids always parse"),
        user_id: "user-1".to_string(),
        started_at,
        ended_at: Some(started_at),
        status: SessionStatus::Completed,
        mode: CaptureMode::Text,
        title: Some(format!("Session {}", id)),
        summary: None,
    }
}

#[derive(Default)]
struct FakeStoreState {
    remote: Vec<JournalSession>,
    saved: Vec<(String, String, DailySummary)>,
}

/// Row store that records calls and answers from memory
#[derive(Clone)]
pub struct FakeStore {
    save_id: Option<String>,
    fail_fetch: bool,
    save_calls: Arc<AtomicUsize>,
    fetch_calls: Arc<AtomicUsize>,
    state: Arc<Mutex<FakeStoreState>>,
}

impl FakeStore {
    /// Saves succeed with id `id`; fetches succeed
    pub fn succeeding(id: &str) -> Self {
        Self {
            save_id: Some(id.to_string()),
            fail_fetch: false,
            save_calls: Arc::new(AtomicUsize::new(0)),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
            state: Arc::new(Mutex::new(FakeStoreState::default())),
        }
    }

    /// Every save and fetch fails
    pub fn failing() -> Self {
        Self {
            save_id: None,
            fail_fetch: true,
            ..Self::succeeding("unused")
        }
    }

    /// Sessions returned by fetches
    pub fn with_remote(self, sessions: Vec<JournalSession>) -> Self {
        self.state.lock().expect("fake store lock").remote = sessions;
        self
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// `(user_id, draft_text, summary)` of every save
    pub fn saved(&self) -> Vec<(String, String, DailySummary)> {
        self.state.lock().expect("fake store lock").saved.clone()
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn save_completed_session(
        &self,
        user_id: &str,
        draft_text: &str,
        summary: &DailySummary,
    ) -> Result<JournalSession> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let Some(id) = &self.save_id else {
            return Err(JournalError::Persistence("backend unreachable".into()).into());
        };
        self.state.lock().expect("fake store lock").saved.push((
            user_id.to_string(),
            draft_text.to_string(),
            summary.clone(),
        ));
        let now = Utc::now();
        Ok(JournalSession {
            id: SessionId::remote(id.clone()),
            user_id: user_id.to_string(),
            started_at: now,
            ended_at: Some(now),
            status: SessionStatus::Completed,
            mode: CaptureMode::Text,
            title: Some(summary.headline.clone()),
            summary: Some(summary.clone()),
        })
    }

    async fn fetch_recent_sessions(
        &self,
        _user_id: &str,
        limit: usize,
    ) -> Result<Vec<JournalSession>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(JournalError::Fetch("backend unreachable".into()).into());
        }
        let state = self.state.lock().expect("fake store lock");
        Ok(state.remote.iter().take(limit).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// AI gateway that returns a canned response or fails
#[derive(Clone)]
pub struct FakeGateway {
    response: AiPipelineResponse,
    failing: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<AiPipelineRequest>>>,
}

impl FakeGateway {
    pub fn responding(response: AiPipelineResponse) -> Self {
        Self {
            response,
            failing: Arc::new(AtomicBool::new(false)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        let gateway = Self::responding(AiPipelineResponse::default());
        gateway.set_failing(true);
        gateway
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<AiPipelineRequest> {
        self.requests.lock().expect("fake gateway lock").clone()
    }
}

#[async_trait]
impl AiGateway for FakeGateway {
    async fn run_pipeline(&self, request: &AiPipelineRequest) -> Result<AiPipelineResponse> {
        self.requests
            .lock()
            .expect("fake gateway lock")
            .push(request.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(JournalError::Gateway("500 Internal Server Error".into()).into());
        }
        Ok(self.response.clone())
    }
}

/// Context signed in as `user-1` with mock AI enabled and settings in a
/// temporary directory
///
/// Keep the returned directory alive for the duration of the test.
pub fn context_with(store: FakeStore, gateway: FakeGateway) -> (AppContext, TempDir) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let settings = SettingsStore::new_with_path(dir.path().join("settings.json"));
    let ctx = AppContext::new(
        Config::default(),
        Arc::new(store),
        Arc::new(StaticAuth::new("user-1")),
        Arc::new(gateway),
        settings,
    );
    (ctx, dir)
}
