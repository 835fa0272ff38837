use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use client_core::{BuiltinDilemmaSource, DilemmaSource, ExperimentClient};
use experiment::{
    export,
    scorer::SummaryStatistics,
    session::{Advance, Session},
    timer::TrialTimer,
};
use shared::{
    domain::{Dilemma, Side},
    protocol::SubmitResultsRequest,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Parser, Debug)]
struct Args {
    /// Experiment server base URL; omit to run offline against the
    /// built-in catalog.
    #[arg(long)]
    server_url: Option<String>,
    /// Free-text participant identifier; blank gets a generated one.
    #[arg(long, default_value = "")]
    participant_id: String,
    /// Directory the CSV export is written into.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let args = Args::parse();

    let client = match &args.server_url {
        Some(url) => Some(ExperimentClient::new(url.clone())?),
        None => None,
    };
    let dilemmas = match &client {
        Some(client) => client.load().await,
        None => BuiltinDilemmaSource.load().await,
    };

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut session = Session::new();
    session.start(&args.participant_id, dilemmas.clone(), &mut rand::thread_rng())?;

    println!("Welcome, {}.", session.participant_id());
    println!("Answer with the arrow keys (or type 'left' / 'right'), then Enter.");

    'experiment: loop {
        let mut timer = TrialTimer::start();
        present(session.current_dilemma()?, session.progress());

        loop {
            let ticker = spawn_ticker();
            let side = read_side(&mut input).await?;
            ticker.abort();
            eprint!("\r        \r");
            let reaction_time = timer.elapsed_secs();

            let finished = match session.respond(side, reaction_time)? {
                Advance::Finished(summary) => Some(summary),
                Advance::NextTrial(_) => None,
            };
            match finished {
                None => {
                    timer.restart();
                    present(session.current_dilemma()?, session.progress());
                }
                Some(summary) => {
                    print_summary(&summary);
                    export_csv(&args.export_dir, &session, &summary)?;
                    if let Some(client) = &client {
                        let request = SubmitResultsRequest {
                            participant_id: session.participant_id().to_string(),
                            results: session.results().to_vec(),
                            timestamp: Utc::now(),
                        };
                        // Failure is logged inside; the local CSV is the
                        // participant's copy either way.
                        let _ = client.submit_results(&request).await;
                    }

                    if !prompt_restart(&mut input).await? {
                        break 'experiment;
                    }
                    session.reset()?;
                    session.start(
                        &args.participant_id,
                        dilemmas.clone(),
                        &mut rand::thread_rng(),
                    )?;
                    continue 'experiment;
                }
            }
        }
    }

    Ok(())
}

fn present(dilemma: &Dilemma, (answered, total): (usize, usize)) {
    println!("\n[{}/{}] {}", answered + 1, total, dilemma.title);
    println!("{}", dilemma.description);
    println!("  left  : {}", dilemma.left_choice.title);
    println!("          {}", dilemma.left_choice.description);
    println!("  right : {}", dilemma.right_choice.title);
    println!("          {}", dilemma.right_choice.description);
}

fn print_summary(summary: &SummaryStatistics) {
    println!("\nSession complete.");
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
    println!("\n{}", summary.explanation());
}

fn export_csv(dir: &Path, session: &Session, summary: &SummaryStatistics) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export::export_filename(session.participant_id(), Utc::now()));
    let csv = export::to_csv(session.participant_id(), session.results(), summary);
    std::fs::write(&path, csv)?;
    println!("Results saved to {}", path.display());
    Ok(())
}

/// Cosmetic elapsed-time display on a fixed cadence. Recorded reaction
/// time comes from a single timer read at the moment of response, so
/// this task never touches the response path.
fn spawn_ticker() -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let shown = TrialTimer::start();
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            eprint!("\r{:5.1}s ", shown.elapsed_secs());
            let _ = std::io::stderr().flush();
        }
    })
}

async fn read_side(input: &mut Lines<BufReader<Stdin>>) -> Result<Side> {
    loop {
        let Some(line) = input.next_line().await? else {
            bail!("input closed before the session finished");
        };
        if let Some(side) = parse_side(&line) {
            return Ok(side);
        }
        // Anything that is not a left/right answer is ignored while a
        // trial is active.
    }
}

async fn prompt_restart(input: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
    println!("\nRun again with a fresh shuffle? (y/N)");
    match input.next_line().await? {
        Some(line) => Ok(matches!(line.trim(), "y" | "Y" | "yes")),
        None => Ok(false),
    }
}

fn parse_side(raw: &str) -> Option<Side> {
    match raw.trim() {
        // Arrow keys arrive as ANSI escape sequences from a line reader.
        "\u{1b}[D" | "left" | "l" => Some(Side::Left),
        "\u{1b}[C" | "right" | "r" => Some(Side::Right),
        _ => None,
    }
}
