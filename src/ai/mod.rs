//! AI pipeline abstraction
//!
//! The hosted pipeline answers two kinds of requests: picking the next
//! follow-up question for a draft, and extracting a summary from a finished
//! entry. The question engine and extractor fall back to deterministic local
//! behavior in mock mode, in which case no gateway is consulted.

use crate::domain::{AiQuestion, DailySummary, MeDbSnapshot};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod extractor;
pub mod gateway;
pub mod questions;

pub use extractor::extract_summary;
pub use gateway::HttpAiGateway;
pub use questions::{next_question, validate_question_answered, QuestionValidation};

/// Which pipeline stage a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Pick a follow-up question for the current draft
    NextQuestion,
    /// Summarize a finished entry
    CompleteSession,
}

/// Request body posted to the pipeline function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPipelineRequest {
    pub mode: PipelineMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asked_questions: Option<Vec<String>>,
    /// Serialized as `null` when there is no previous question
    #[serde(default)]
    pub last_question: Option<String>,
    pub me_db: MeDbSnapshot,
}

impl AiPipelineRequest {
    /// Request for the next follow-up question
    pub fn next_question(
        draft_text: &str,
        asked_questions: &[String],
        last_question: Option<&str>,
        me_db: &MeDbSnapshot,
    ) -> Self {
        Self {
            mode: PipelineMode::NextQuestion,
            session_id: None,
            draft_text: Some(draft_text.to_string()),
            final_text: None,
            asked_questions: Some(asked_questions.to_vec()),
            last_question: last_question.map(str::to_string),
            me_db: me_db.clone(),
        }
    }

    /// Request for a summary of a finished entry
    pub fn complete_session(final_text: &str, me_db: &MeDbSnapshot) -> Self {
        Self {
            mode: PipelineMode::CompleteSession,
            session_id: None,
            draft_text: None,
            final_text: Some(final_text.to_string()),
            asked_questions: None,
            last_question: None,
            me_db: me_db.clone(),
        }
    }
}

/// Extraction results of a `complete_session` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSession {
    pub daily_summary: DailySummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me_db_updates: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_ups_for_tomorrow: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDebug {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_fallback: Option<bool>,
}

/// Response of the pipeline function; every section is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPipelineResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_question: Option<AiQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<QuestionValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<ExtractedSession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Advice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<PipelineDebug>,
}

/// Transport for AI pipeline requests
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Run one pipeline request
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JournalError::Gateway`] if the call fails or
    /// the function responds with a non-success status.
    async fn run_pipeline(&self, request: &AiPipelineRequest) -> Result<AiPipelineResponse>;
}
