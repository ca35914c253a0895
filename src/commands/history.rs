use crate::app::AppContext;
use crate::domain::JournalSession;
use crate::error::Result;
use crate::reconcile::HistoryView;
use colored::Colorize;
use prettytable::{format, Table};

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn summary_preview(session: &JournalSession) -> String {
    session
        .summary
        .as_ref()
        .and_then(|summary| summary.bullets.first())
        .map(|bullet| truncate(bullet, 50))
        .unwrap_or_else(|| "-".to_string())
}

/// Print a history view as a table
pub fn print_history(view: &HistoryView) {
    if let Some(warning) = &view.warning {
        println!("{}", warning.yellow());
    }

    if view.sessions.is_empty() {
        println!("{}", "No journal sessions yet.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Started".bold(),
        "Title".bold(),
        "Summary".bold(),
        "Stored".bold()
    ]);

    for session in &view.sessions {
        let id = session.id.to_string();
        let id_short = truncate(&id, 16);
        let started = session
            .started_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        let stored = if session.id.is_local() {
            "memory".yellow()
        } else {
            "backend".green()
        };

        table.add_row(prettytable::row![
            id_short.cyan(),
            started,
            truncate(session.display_title(), 40),
            summary_preview(session),
            stored
        ]);
    }

    println!("\nJournal History:");
    table.printstd();
    println!();
}

/// Handle `dayjot history`
pub async fn handle_history(ctx: &AppContext, limit: Option<usize>, json: bool) -> Result<()> {
    let limit = limit.unwrap_or(ctx.config.store.history_limit);
    let view = ctx.history(limit).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_history(&view);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::session_with_id;

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 10), "abcdefg...");
    }

    #[test]
    fn test_summary_preview_uses_first_bullet() {
        let mut session = session_with_id("a", 0);
        assert_eq!(summary_preview(&session), "-");
        session.summary = Some(crate::domain::DailySummary::new(
            "h",
            vec!["first".into(), "second".into()],
        ));
        assert_eq!(summary_preview(&session), "first");
    }
}
