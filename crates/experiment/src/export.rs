use chrono::{DateTime, SecondsFormat, Utc};
use shared::domain::TrialResult;

use crate::scorer::SummaryStatistics;

pub const CSV_COLUMNS: [&str; 7] = [
    "Participant ID",
    "Dilemma ID",
    "Dilemma Title",
    "Choice",
    "Ethical Framework",
    "Reaction Time (s)",
    "Timestamp",
];

/// Serializes a finished session into the downloadable CSV report: one
/// row per trial, a blank separator line, then the summary block with
/// percentages and average reaction time at two decimal places.
pub fn to_csv(participant_id: &str, results: &[TrialResult], summary: &SummaryStatistics) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_COLUMNS.iter().map(|c| c.to_string()));

    for result in results {
        push_row(
            &mut out,
            [
                escape_field(participant_id),
                result.dilemma_id.0.to_string(),
                // Titles are always quoted so embedded commas survive.
                quote(&result.dilemma_title),
                result.choice.as_str().to_string(),
                result.framework.as_str().to_string(),
                result.reaction_time.to_string(),
                result.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            ],
        );
    }

    out.push('\n');
    push_row(&mut out, summary_row("Summary", ""));
    push_row(
        &mut out,
        summary_row(
            "Utilitarian Percentage",
            &format!("{:.2}%", summary.utilitarian_percentage),
        ),
    );
    push_row(
        &mut out,
        summary_row(
            "Deontological Percentage",
            &format!("{:.2}%", summary.deontological_percentage),
        ),
    );
    push_row(
        &mut out,
        summary_row(
            "Average Reaction Time",
            &format!("{:.2}s", summary.average_reaction_time),
        ),
    );
    out
}

/// `trolley_results_<participant>_<YYYY-MM-DD>.csv`, with the
/// participant id reduced to filename-safe characters.
pub fn export_filename(participant_id: &str, date: DateTime<Utc>) -> String {
    format!(
        "trolley_results_{}_{}.csv",
        sanitize_for_filename(participant_id),
        date.format("%Y-%m-%d")
    )
}

pub fn sanitize_for_filename(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

fn summary_row(label: &str, value: &str) -> [String; 7] {
    [
        label.to_string(),
        value.to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
    ]
}

/// Embedded quotes are doubled per standard CSV quoting rules.
fn quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

fn escape_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        quote(raw)
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
