//! Follow-up question engine

use crate::ai::{AiGateway, AiPipelineRequest};
use crate::domain::{AiQuestion, MeDbSnapshot};
use crate::error::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Questions used in mock mode and when the pipeline returns none
pub const FALLBACK_QUESTIONS: [(&str, &str); 3] = [
    ("What felt most meaningful today?", "meaning"),
    ("What took the most energy?", "energy"),
    ("Was there a small win you want to remember?", "wins"),
];

/// Minimum trimmed draft length counted as an answer in mock mode
const MOCK_ANSWER_MIN_CHARS: usize = 20;

/// Whether the draft answers the last question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionValidation {
    pub answered: bool,
    #[serde(default)]
    pub evidence: Vec<String>,
}

fn fallback_question(index: usize) -> AiQuestion {
    let (question, tag) = FALLBACK_QUESTIONS[index % FALLBACK_QUESTIONS.len()];
    AiQuestion::new(question, tag)
}

/// Pick the next follow-up question
///
/// With no gateway (mock mode) this walks the fallback list, returning the
/// first question not yet asked and starting over once all were used. With
/// a gateway the pipeline decides; a response without a question yields a
/// randomly chosen fallback.
///
/// # Errors
///
/// Propagates gateway errors.
///
/// # Examples
///
/// ```
/// use dayjot::ai::next_question;
/// use dayjot::domain::MeDbSnapshot;
///
/// # #[tokio::main]
/// # async fn main() {
/// let asked = vec!["What felt most meaningful today?".to_string()];
/// let q = next_question(None, "Long day", &asked, &MeDbSnapshot::default())
///     .await
///     .unwrap();
/// assert_eq!(q.coverage_tag, "energy");
/// # }
/// ```
pub async fn next_question(
    gateway: Option<&dyn AiGateway>,
    draft_text: &str,
    asked_questions: &[String],
    me_db: &MeDbSnapshot,
) -> Result<AiQuestion> {
    let Some(gateway) = gateway else {
        let next = FALLBACK_QUESTIONS
            .iter()
            .position(|(question, _)| !asked_questions.iter().any(|asked| asked == question))
            .unwrap_or(0);
        return Ok(fallback_question(next));
    };

    let request = AiPipelineRequest::next_question(
        draft_text,
        asked_questions,
        asked_questions.last().map(String::as_str),
        me_db,
    );
    let response = gateway.run_pipeline(&request).await?;

    Ok(response.next_question.unwrap_or_else(|| {
        tracing::debug!("Pipeline returned no question; using a fallback");
        fallback_question(rand::rng().random_range(0..FALLBACK_QUESTIONS.len()))
    }))
}

/// Check whether the draft answers `last_question`
///
/// Mock mode counts any draft longer than 20 trimmed characters as an
/// answer. Live mode asks the pipeline and treats a missing verdict as
/// unanswered.
///
/// # Errors
///
/// Propagates gateway errors.
pub async fn validate_question_answered(
    gateway: Option<&dyn AiGateway>,
    draft_text: &str,
    last_question: Option<&str>,
    me_db: &MeDbSnapshot,
) -> Result<QuestionValidation> {
    let Some(gateway) = gateway else {
        return Ok(QuestionValidation {
            answered: draft_text.trim().chars().count() > MOCK_ANSWER_MIN_CHARS,
            evidence: Vec::new(),
        });
    };

    let request = AiPipelineRequest::next_question(draft_text, &[], last_question, me_db);
    let response = gateway.run_pipeline(&request).await?;
    Ok(response.validator.unwrap_or_default())
}
