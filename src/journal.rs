//! Draft editing and the save/fallback flow
//!
//! A [`JournalFlow`] owns the draft being written, the follow-up questions
//! asked so far, and the most recent summary. Completing the draft extracts
//! a summary and saves it to the row store. If either step fails the entry
//! is still recorded, as an in-memory fallback session.

use crate::ai::{extract_summary, next_question};
use crate::app::AppContext;
use crate::domain::{AiQuestion, DailySummary, JournalSession};
use crate::error::{JournalError, Result};

/// Shown after the row store confirmed the save
pub const SAVED_MESSAGE: &str = "Session saved. Your entry is in history.";

/// Shown after a failed save was recorded locally
pub const FALLBACK_MESSAGE: &str = "Saved locally. Could not reach the backend. Saved in memory.";

/// Rejection of a blank draft on completion
pub const EMPTY_DRAFT_MESSAGE: &str = "Draft is empty. Write something before completing.";

/// Rejection of a blank draft when asking for a question
pub const QUESTION_NEEDS_DRAFT_MESSAGE: &str = "Write a bit before requesting a question.";

/// Shown when no question could be produced
pub const QUESTION_UNAVAILABLE_MESSAGE: &str = "Question unavailable. Try again in a moment.";

const SIGN_IN_REQUIRED_MESSAGE: &str = "Please sign in before saving.";

/// User id recorded on fallback sessions when nobody is signed in
const FALLBACK_USER_ID: &str = "local";

/// Progress of the most recent completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    /// A completion is running
    Saving,
    /// The last completion reached the row store
    Saved,
    /// The last completion was recorded only in memory
    FallbackSaved,
}

/// Result of [`JournalFlow::complete`]
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// Persisted remotely; the canonical record
    Saved(JournalSession),
    /// Persisted only in the local cache
    FallbackSaved {
        session: JournalSession,
        /// Why the remote save did not happen
        reason: String,
    },
}

impl CompletionOutcome {
    /// The session added to the cache
    pub fn session(&self) -> &JournalSession {
        match self {
            CompletionOutcome::Saved(session) => session,
            CompletionOutcome::FallbackSaved { session, .. } => session,
        }
    }

    /// User-facing confirmation
    pub fn message(&self) -> &'static str {
        match self {
            CompletionOutcome::Saved(_) => SAVED_MESSAGE,
            CompletionOutcome::FallbackSaved { .. } => FALLBACK_MESSAGE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CompletionOutcome::FallbackSaved { .. })
    }
}

/// Editing state of one journaling session
///
/// # Examples
///
/// ```
/// use dayjot::journal::{JournalFlow, SaveState};
///
/// let mut flow = JournalFlow::new();
/// flow.append_to_draft("Slept well.");
/// flow.append_to_draft("Busy afternoon.");
/// assert_eq!(flow.draft(), "Slept well.\nBusy afternoon.");
/// assert_eq!(flow.state(), SaveState::Idle);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JournalFlow {
    draft: String,
    current_question: Option<AiQuestion>,
    asked_questions: Vec<String>,
    last_summary: Option<DailySummary>,
    state: SaveState,
}

impl JournalFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn current_question(&self) -> Option<&AiQuestion> {
        self.current_question.as_ref()
    }

    pub fn asked_questions(&self) -> &[String] {
        &self.asked_questions
    }

    /// Summary extracted by the most recent completion attempt that got one
    pub fn last_summary(&self) -> Option<&DailySummary> {
        self.last_summary.as_ref()
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    /// Replace the draft text
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Append a line to the draft
    pub fn append_to_draft(&mut self, text: &str) {
        if !self.draft.is_empty() {
            self.draft.push('\n');
        }
        self.draft.push_str(text);
    }

    /// Discard the draft, questions, and summary
    ///
    /// Also clears a `Saving` state left behind by an abandoned completion.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Ask for the next follow-up question
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Validation`] for a blank draft and
    /// [`JournalError::Question`] when the engine fails. Neither changes the
    /// flow.
    pub async fn next_question(&mut self, ctx: &AppContext) -> Result<AiQuestion> {
        if self.draft.trim().is_empty() {
            return Err(JournalError::Validation(QUESTION_NEEDS_DRAFT_MESSAGE.to_string()).into());
        }

        let question = next_question(
            ctx.ai_gateway(),
            &self.draft,
            &self.asked_questions,
            &ctx.me_db,
        )
        .await
        .map_err(|e| {
            tracing::warn!("Question engine failed: {:#}", e);
            JournalError::Question(QUESTION_UNAVAILABLE_MESSAGE.to_string())
        })?;

        self.asked_questions.push(question.question.clone());
        self.current_question = Some(question.clone());
        Ok(question)
    }

    /// Finish the draft: summarize it and save it
    ///
    /// Makes exactly one save attempt. On success the canonical session is
    /// cached and the draft and questions are cleared. If summarizing or
    /// saving fails, a fallback session with a local id is cached instead,
    /// the draft is kept for a retry, and the failure is reported through
    /// [`CompletionOutcome::FallbackSaved`] rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Validation`] for a blank draft,
    /// [`JournalError::SaveInProgress`] while another completion runs, and
    /// [`JournalError::AuthenticationRequired`] without a signed-in user.
    /// None of these change the flow or the cache.
    pub async fn complete(&mut self, ctx: &mut AppContext) -> Result<CompletionOutcome> {
        if self.draft.trim().is_empty() {
            return Err(JournalError::Validation(EMPTY_DRAFT_MESSAGE.to_string()).into());
        }
        if self.state == SaveState::Saving {
            return Err(JournalError::SaveInProgress.into());
        }
        let Some(user_id) = ctx.current_user_id() else {
            return Err(
                JournalError::AuthenticationRequired(SIGN_IN_REQUIRED_MESSAGE.to_string()).into(),
            );
        };

        self.state = SaveState::Saving;

        let saved = match extract_summary(ctx.ai_gateway(), &self.draft, &ctx.me_db).await {
            Ok(summary) => {
                self.last_summary = Some(summary.clone());
                ctx.store
                    .save_completed_session(&user_id, &self.draft, &summary)
                    .await
            }
            Err(e) => Err(e),
        };

        match saved {
            Ok(session) => {
                tracing::info!(session_id = %session.id, "Journal entry saved");
                ctx.cache.add_session(session.clone());
                self.draft.clear();
                self.current_question = None;
                self.asked_questions.clear();
                self.state = SaveState::Saved;
                Ok(CompletionOutcome::Saved(session))
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!("Save failed, keeping entry in memory: {}", reason);

                let summary = self
                    .last_summary
                    .clone()
                    .unwrap_or_else(DailySummary::fallback_default);
                let owner = ctx
                    .current_user_id()
                    .unwrap_or_else(|| FALLBACK_USER_ID.to_string());
                let session = JournalSession::fallback(owner, summary);

                ctx.cache.add_session(session.clone());
                self.state = SaveState::FallbackSaved;
                Ok(CompletionOutcome::FallbackSaved { session, reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiPipelineResponse, ExtractedSession};
    use crate::auth::StaticAuth;
    use crate::domain::{SessionId, SessionStatus};
    use crate::test_utils::{context_with, FakeGateway, FakeStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_complete_success_caches_and_clears_draft() {
        let store = FakeStore::succeeding("abc");
        let (mut ctx, _dir) = context_with(store.clone(), FakeGateway::failing());
        let mut flow = JournalFlow::new();
        flow.set_draft("Good day");

        let outcome = flow.complete(&mut ctx).await.unwrap();

        assert_eq!(outcome.session().id, SessionId::remote("abc"));
        assert_eq!(outcome.message(), SAVED_MESSAGE);
        assert_eq!(ctx.cache.len(), 1);
        assert_eq!(ctx.cache.sessions()[0].id, SessionId::remote("abc"));
        assert_eq!(flow.draft(), "");
        assert_eq!(flow.state(), SaveState::Saved);
        assert_eq!(store.save_calls(), 1);
    }

    #[tokio::test]
    async fn test_complete_failure_falls_back_and_keeps_draft() {
        let store = FakeStore::failing();
        let (mut ctx, _dir) = context_with(store.clone(), FakeGateway::failing());
        let mut flow = JournalFlow::new();
        flow.set_draft("Good day");

        let outcome = flow.complete(&mut ctx).await.unwrap();

        assert!(outcome.is_fallback());
        assert_eq!(outcome.message(), FALLBACK_MESSAGE);
        let session = &ctx.cache.sessions()[0];
        assert!(session.id.is_local());
        assert!(session.id.to_string().starts_with("local-"));
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.user_id, "user-1");
        // Mock extraction succeeded before the store failed.
        assert_eq!(session.title.as_deref(), Some("Good day"));
        assert_eq!(flow.draft(), "Good day");
        assert_eq!(flow.state(), SaveState::FallbackSaved);
        assert_eq!(store.save_calls(), 1);
    }

    #[tokio::test]
    async fn test_complete_blank_draft_is_rejected_without_store_call() {
        let store = FakeStore::succeeding("abc");
        let (mut ctx, _dir) = context_with(store.clone(), FakeGateway::failing());
        let mut flow = JournalFlow::new();
        flow.set_draft("   \n ");

        let err = flow.complete(&mut ctx).await.unwrap_err();
        match err.downcast_ref::<JournalError>() {
            Some(JournalError::Validation(msg)) => assert_eq!(msg, EMPTY_DRAFT_MESSAGE),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.save_calls(), 0);
        assert!(ctx.cache.is_empty());
        assert_eq!(flow.state(), SaveState::Idle);
    }

    #[tokio::test]
    async fn test_complete_requires_signed_in_user() {
        let store = FakeStore::succeeding("abc");
        let (mut ctx, _dir) = context_with(store.clone(), FakeGateway::failing());
        ctx.auth = Arc::new(StaticAuth::signed_out());
        let mut flow = JournalFlow::new();
        flow.set_draft("Good day");

        let err = flow.complete(&mut ctx).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JournalError>(),
            Some(JournalError::AuthenticationRequired(_))
        ));
        assert_eq!(flow.draft(), "Good day");
        assert_eq!(store.save_calls(), 0);
        assert!(ctx.cache.is_empty());
    }

    #[tokio::test]
    async fn test_complete_rejects_reentry_while_saving() {
        let (mut ctx, _dir) = context_with(FakeStore::succeeding("abc"), FakeGateway::failing());
        let mut flow = JournalFlow::new();
        flow.set_draft("Good day");
        flow.state = SaveState::Saving;

        let err = flow.complete(&mut ctx).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JournalError>(),
            Some(JournalError::SaveInProgress)
        ));
        assert!(ctx.cache.is_empty());

        flow.reset();
        assert_eq!(flow.state(), SaveState::Idle);
    }

    #[tokio::test]
    async fn test_gateway_failure_falls_back_with_default_summary() {
        let store = FakeStore::succeeding("abc");
        let (mut ctx, _dir) = context_with(store.clone(), FakeGateway::failing());
        ctx.config.ai.mock_mode = Some(false);
        let mut flow = JournalFlow::new();
        flow.set_draft("Good day");

        let outcome = flow.complete(&mut ctx).await.unwrap();

        assert!(outcome.is_fallback());
        assert_eq!(
            outcome.session().summary,
            Some(DailySummary::fallback_default())
        );
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_reuses_previous_summary() {
        let store = FakeStore::failing();
        let gateway = FakeGateway::responding(AiPipelineResponse {
            extracted: Some(ExtractedSession {
                daily_summary: DailySummary::new("Earlier", vec![]),
                signals: None,
                me_db_updates: None,
                follow_ups_for_tomorrow: None,
            }),
            ..Default::default()
        });
        let (mut ctx, _dir) = context_with(store, gateway.clone());
        ctx.config.ai.mock_mode = Some(false);
        let mut flow = JournalFlow::new();
        flow.set_draft("Good day");

        flow.complete(&mut ctx).await.unwrap();
        gateway.set_failing(true);
        let outcome = flow.complete(&mut ctx).await.unwrap();

        assert_eq!(outcome.session().title.as_deref(), Some("Earlier"));
        assert_eq!(ctx.cache.len(), 2);
        assert_ne!(ctx.cache.sessions()[0].id, ctx.cache.sessions()[1].id);
    }

    #[tokio::test]
    async fn test_next_question_records_history() {
        let (ctx, _dir) = context_with(FakeStore::succeeding("abc"), FakeGateway::failing());
        let mut flow = JournalFlow::new();
        flow.set_draft("Long day at work");

        let first = flow.next_question(&ctx).await.unwrap();
        let second = flow.next_question(&ctx).await.unwrap();

        assert_eq!(first.coverage_tag, "meaning");
        assert_eq!(second.coverage_tag, "energy");
        assert_eq!(flow.asked_questions().len(), 2);
        assert_eq!(flow.current_question(), Some(&second));
    }

    #[tokio::test]
    async fn test_next_question_blank_draft_is_rejected() {
        let (ctx, _dir) = context_with(FakeStore::succeeding("abc"), FakeGateway::failing());
        let mut flow = JournalFlow::new();

        let err = flow.next_question(&ctx).await.unwrap_err();
        match err.downcast_ref::<JournalError>() {
            Some(JournalError::Validation(msg)) => assert_eq!(msg, QUESTION_NEEDS_DRAFT_MESSAGE),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_next_question_engine_failure_leaves_state_unchanged() {
        let (mut ctx, _dir) = context_with(FakeStore::succeeding("abc"), FakeGateway::failing());
        ctx.config.ai.mock_mode = Some(false);
        let mut flow = JournalFlow::new();
        flow.set_draft("Long day");

        let err = flow.next_question(&ctx).await.unwrap_err();
        match err.downcast_ref::<JournalError>() {
            Some(JournalError::Question(msg)) => assert_eq!(msg, QUESTION_UNAVAILABLE_MESSAGE),
            other => panic!("expected question error, got {:?}", other),
        }
        assert!(flow.asked_questions().is_empty());
        assert!(flow.current_question().is_none());
    }

    #[tokio::test]
    async fn test_success_clears_questions() {
        let (mut ctx, _dir) = context_with(FakeStore::succeeding("abc"), FakeGateway::failing());
        let mut flow = JournalFlow::new();
        flow.set_draft("Long day");
        flow.next_question(&ctx).await.unwrap();

        flow.complete(&mut ctx).await.unwrap();

        assert!(flow.asked_questions().is_empty());
        assert!(flow.current_question().is_none());
        assert!(flow.last_summary().is_some());
    }
}
