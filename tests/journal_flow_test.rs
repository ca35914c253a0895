//! End-to-end journal flow tests with real store adapters

mod common;

use dayjot::ai::HttpAiGateway;
use dayjot::auth::{AuthProvider, StaticAuth};
use dayjot::config::Config;
use dayjot::error::JournalError;
use dayjot::journal::{CompletionOutcome, JournalFlow, SaveState, FALLBACK_MESSAGE};
use dayjot::reconcile::OFFLINE_HISTORY_WARNING;
use dayjot::settings::SettingsStore;
use dayjot::store::{RemoteStore, SupabaseStore};
use dayjot::AppContext;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(store: Arc<dyn RemoteStore>, auth: Arc<dyn AuthProvider>, dir: &TempDir) -> AppContext {
    let gateway = Arc::new(HttpAiGateway::new(
        common::client_for("http://127.0.0.1:9"),
        "ai-run-pipeline",
    ));
    let settings = SettingsStore::new_with_path(dir.path().join("settings.json"));
    AppContext::new(Config::default(), store, auth, gateway, settings)
}

#[tokio::test]
async fn test_sqlite_save_round_trips_through_history() {
    let (store, dir) = common::create_temp_store();
    let mut ctx = context(Arc::new(store), Arc::new(StaticAuth::new("user-1")), &dir);
    let mut flow = JournalFlow::new();
    flow.set_draft("Good day. Went for a long walk.");

    let outcome = flow.complete(&mut ctx).await.unwrap();

    let saved = match &outcome {
        CompletionOutcome::Saved(session) => session.clone(),
        other => panic!("expected saved outcome, got {:?}", other),
    };
    assert!(saved.id.is_remote());
    assert_eq!(saved.title.as_deref(), Some("Good day"));
    assert_eq!(flow.draft(), "");
    assert_eq!(flow.state(), SaveState::Saved);

    // The record is both cached and stored; history shows it once.
    let view = ctx.history(20).await;
    assert!(view.warning.is_none());
    assert_eq!(view.sessions.len(), 1);
    assert_eq!(view.sessions[0].id, saved.id);
    assert_eq!(view.sessions[0].summary.as_ref().unwrap().bullets.len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend_falls_back_and_history_warns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = SupabaseStore::new(common::client_for(&server.uri()));
    let mut ctx = context(Arc::new(store), Arc::new(StaticAuth::new("user-1")), &dir);
    let mut flow = JournalFlow::new();
    flow.set_draft("Good day");

    let outcome = flow.complete(&mut ctx).await.unwrap();

    assert_eq!(outcome.message(), FALLBACK_MESSAGE);
    let session = outcome.session();
    assert!(session.id.is_local());
    assert_eq!(session.user_id, "user-1");
    assert_eq!(session.ended_at, Some(session.started_at));
    assert_eq!(flow.draft(), "Good day");
    assert_eq!(ctx.cache.local_only_count(), 1);

    let view = ctx.history(20).await;
    assert_eq!(view.warning.as_deref(), Some(OFFLINE_HISTORY_WARNING));
    assert_eq!(view.sessions.len(), 1);
    assert_eq!(view.sessions[0].id, session.id);
}

#[tokio::test]
async fn test_retry_after_fallback_creates_a_second_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = SupabaseStore::new(common::client_for(&server.uri()));
    let mut ctx = context(Arc::new(store), Arc::new(StaticAuth::new("user-1")), &dir);
    let mut flow = JournalFlow::new();
    flow.set_draft("Good day");

    let first = flow.complete(&mut ctx).await.unwrap();
    let second = flow.complete(&mut ctx).await.unwrap();

    assert_ne!(first.session().id, second.session().id);
    assert_eq!(ctx.cache.len(), 2);
}

#[tokio::test]
async fn test_blank_draft_never_reaches_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = SupabaseStore::new(common::client_for(&server.uri()));
    let mut ctx = context(Arc::new(store), Arc::new(StaticAuth::new("user-1")), &dir);
    let mut flow = JournalFlow::new();
    flow.set_draft("");

    let err = flow.complete(&mut ctx).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<JournalError>(),
        Some(JournalError::Validation(_))
    ));
    assert!(ctx.cache.is_empty());
}

#[tokio::test]
async fn test_signed_out_user_sees_local_history_only() {
    let (store, dir) = common::create_temp_store();
    store
        .save_completed_session(
            "user-1",
            "stored earlier",
            &dayjot::DailySummary::new("Earlier", vec![]),
        )
        .await
        .unwrap();

    let ctx = context(Arc::new(store), Arc::new(StaticAuth::signed_out()), &dir);
    let view = ctx.history(20).await;

    assert!(view.sessions.is_empty());
    assert!(view.warning.is_none());
}
