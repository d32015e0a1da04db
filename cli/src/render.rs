//! Plain-text rendering of dashboard snapshots.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write;

use message_dashboard::net::types::{Message, MessageId, Sentiment};
use message_dashboard::state::ops::{OpPhase, Outcome, OperationTracker};
use message_dashboard::state::store::DashboardState;

const TEXT_WIDTH: usize = 44;

/// Render the whole table view: error banner, loading line, summary, rows.
pub fn render(state: &DashboardState) -> String {
    let mut out = String::new();
    if let Some(error) = state.error() {
        let _ = writeln!(out, "!! {error}");
    }
    if state.filter.has_input() {
        let (from, to) = state.filter.date_range();
        let _ = writeln!(
            out,
            "Filter: physician='{}' from='{from}' to='{to}'  (type `clear` to reset)",
            state.filter.text()
        );
    }
    if state.loading() {
        out.push_str("Loading messages...\n");
        return out;
    }

    let records = state.records();
    if records.is_empty() {
        out.push_str("No messages found\n");
        return out;
    }

    let noun = if records.len() == 1 { "message" } else { "messages" };
    let _ = writeln!(out, "Showing {} {noun}", records.len());
    let _ = writeln!(
        out,
        "{:>8}  {:>9}  {:<width$}  {:<19}  {:<12}  {:<12}  Action",
        "ID",
        "Physician",
        "Message",
        "Timestamp",
        "Topic",
        "Sentiment",
        width = TEXT_WIDTH,
    );
    for message in records {
        render_row(&mut out, state, message);
    }
    out
}

fn render_row(out: &mut String, state: &DashboardState, message: &Message) {
    let (action, outcome) = match state.ops.phase(message.message_id) {
        OpPhase::Idle => ("Classify", None),
        OpPhase::InFlight { previous } => ("Classifying...", previous),
        OpPhase::Resolved(outcome) => ("Classify", Some(outcome)),
    };
    let _ = writeln!(
        out,
        "{:>8}  {:>9}  {:<width$}  {:<19}  {:<12}  {:<12}  [{action}]",
        message.message_id.0,
        message.physician_id,
        truncate(&message.message_text, TEXT_WIDTH),
        message.timestamp.to_display_string(),
        message.topic.as_deref().unwrap_or("-"),
        sentiment_badge(message.sentiment.as_ref()),
        width = TEXT_WIDTH,
    );
    if let Some(outcome) = outcome {
        let _ = writeln!(out, "{:>10}Classification: {outcome}", "");
    }
}

/// Sentiment label with a tone marker; positive and negative are set apart.
pub fn sentiment_badge(sentiment: Option<&Sentiment>) -> String {
    match sentiment {
        Some(Sentiment::Positive) => "(+) positive".to_owned(),
        Some(Sentiment::Negative) => "(-) negative".to_owned(),
        Some(Sentiment::Other(label)) => label.clone(),
        None => "-".to_owned(),
    }
}

/// Cut `text` to at most `width` characters, marking the cut with `...`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Outcomes in `current` resolved after `seen` was taken, repeats included.
pub fn resolved_since(seen: &OperationTracker, current: &OperationTracker) -> Vec<(MessageId, Outcome)> {
    let mut fresh: Vec<(MessageId, Outcome)> = current
        .outcomes()
        .iter()
        .filter(|(id, _)| current.resolution(**id) != seen.resolution(**id))
        .map(|(id, outcome)| (*id, outcome.clone()))
        .collect();
    fresh.sort_by_key(|(id, _)| *id);
    fresh
}
