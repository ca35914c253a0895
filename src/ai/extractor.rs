//! Summary extraction for finished entries

use crate::ai::{AiGateway, AiPipelineRequest};
use crate::domain::{DailySummary, MeDbSnapshot};
use crate::error::Result;

const MOCK_HEADLINE_MAX_CHARS: usize = 80;
const MOCK_BULLETS: [&str; 2] = [
    "Captured a few key moments from the day.",
    "Noted energy and mood shifts.",
];

fn mock_summary(final_text: &str) -> DailySummary {
    let first_sentence = final_text.trim().split('.').next().unwrap_or_default();
    let headline: String = first_sentence.chars().take(MOCK_HEADLINE_MAX_CHARS).collect();
    let headline = if headline.is_empty() {
        "Today".to_string()
    } else {
        headline
    };
    DailySummary::new(headline, MOCK_BULLETS.iter().map(|b| b.to_string()).collect())
}

/// Summarize a finished entry
///
/// Mock mode (no gateway) derives the headline from the first sentence of
/// the text. Live mode asks the pipeline and substitutes a bare "Summary"
/// headline when the response carries no extraction.
///
/// # Errors
///
/// Propagates gateway errors.
pub async fn extract_summary(
    gateway: Option<&dyn AiGateway>,
    final_text: &str,
    me_db: &MeDbSnapshot,
) -> Result<DailySummary> {
    let Some(gateway) = gateway else {
        return Ok(mock_summary(final_text));
    };

    let response = gateway
        .run_pipeline(&AiPipelineRequest::complete_session(final_text, me_db))
        .await?;

    Ok(match response.extracted {
        Some(extracted) => extracted.daily_summary,
        None => {
            tracing::debug!("Pipeline returned no extraction; using bare summary");
            DailySummary::new("Summary", Vec::new())
        }
    })
}
