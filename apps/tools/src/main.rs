use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use experiment::{export, scorer::summarize};
use shared::domain::SubmissionId;
use storage::Storage;

/// Operator-side viewer for stored experiment results.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/trolley.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored submissions.
    Submissions,
    /// Summarize one participant's stored results.
    Participant { participant_id: String },
    /// Aggregate report across all participants, as JSON.
    Report {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Re-export one submission as a CSV report.
    Export {
        submission_id: i64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Submissions => {
            let submissions = storage.list_submissions().await?;
            if submissions.is_empty() {
                println!("no submissions stored");
                return Ok(());
            }
            println!(
                "{:>6}  {:<24}  {:<25}  {:>6}",
                "id", "participant", "submitted at", "trials"
            );
            for s in submissions {
                println!(
                    "{:>6}  {:<24}  {:<25}  {:>6}",
                    s.submission_id.0,
                    s.participant_id,
                    s.submitted_at.to_rfc3339(),
                    s.trial_count
                );
            }
        }
        Command::Participant { participant_id } => {
            let results = storage.results_for_participant(&participant_id).await?;
            if results.is_empty() {
                bail!("no results stored for participant '{participant_id}'");
            }
            let summary = summarize(&results)?;
            println!("Participant: {participant_id}");
            println!("Trials answered: {}", summary.total_trials);
            println!("Utilitarian choices: {:.2}%", summary.utilitarian_percentage);
            println!(
                "Deontological choices: {:.2}%",
                summary.deontological_percentage
            );
            println!(
                "Average reaction time: {:.2}s",
                summary.average_reaction_time
            );
            println!("Dominant framework: {}", summary.classification.label());
            println!();
            println!("{:>4}  {:<40}  {:<14}  {:>8}", "id", "dilemma", "framework", "rt");
            for r in &results {
                println!(
                    "{:>4}  {:<40}  {:<14}  {:>7.2}s",
                    r.dilemma_id.0,
                    truncate(&r.dilemma_title, 40),
                    r.framework.as_str(),
                    r.reaction_time
                );
            }
        }
        Command::Report { out } => {
            let trials = storage.all_results().await?;
            if trials.is_empty() {
                bail!("no results stored yet");
            }
            let report = analytics::build_report(&trials)?;
            let rendered = serde_json::to_string_pretty(&report)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &rendered)?;
                    println!("report written to {}", path.display());
                }
                None => println!("{rendered}"),
            }
        }
        Command::Export { submission_id, out } => {
            let submission_id = SubmissionId(submission_id);
            let Some(submission) = storage.submission(submission_id).await? else {
                bail!("submission {} not found", submission_id.0);
            };
            let results = storage.results_for_submission(submission_id).await?;
            let summary = summarize(&results)?;
            let csv = export::to_csv(&submission.participant_id, &results, &summary);
            match out {
                Some(path) => {
                    std::fs::write(&path, &csv)?;
                    println!("csv written to {}", path.display());
                }
                None => print!("{csv}"),
            }
        }
    }

    Ok(())
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        raw.to_string()
    } else {
        let kept: String = raw.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
