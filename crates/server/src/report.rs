use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use experiment::{export, scorer::SummaryStatistics};
use shared::domain::TrialResult;

/// Writes the per-submission CSV report plus a JSON sidecar with the
/// raw results and summary, mirroring what the participant can download
/// locally. Returns the CSV path.
pub fn write_reports(
    results_dir: &Path,
    participant_id: &str,
    submitted_at: DateTime<Utc>,
    results: &[TrialResult],
    summary: &SummaryStatistics,
) -> Result<PathBuf> {
    fs::create_dir_all(results_dir).with_context(|| {
        format!("failed to create results directory '{}'", results_dir.display())
    })?;

    let csv_name = export::export_filename(participant_id, submitted_at);
    let csv_path = results_dir.join(&csv_name);
    let csv = export::to_csv(participant_id, results, summary);
    fs::write(&csv_path, csv)
        .with_context(|| format!("failed to write csv report '{}'", csv_path.display()))?;

    let json_path = csv_path.with_extension("json");
    let sidecar = serde_json::json!({
        "participantId": participant_id,
        "timestamp": submitted_at.to_rfc3339(),
        "results": results,
        "summary": summary,
    });
    fs::write(&json_path, serde_json::to_vec_pretty(&sidecar)?)
        .with_context(|| format!("failed to write json report '{}'", json_path.display()))?;

    Ok(csv_path)
}
