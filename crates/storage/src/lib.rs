use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{
    DilemmaId, Framework, ParticipantTrial, Side, SubmissionId, TrialResult,
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct SubmissionSummary {
    pub submission_id: SubmissionId,
    pub participant_id: String,
    pub submitted_at: DateTime<Utc>,
    pub trial_count: i64,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Persists one finished session: a submission row plus one row per
    /// recorded trial.
    pub async fn record_submission(
        &self,
        participant_id: &str,
        submitted_at: DateTime<Utc>,
        results: &[TrialResult],
    ) -> Result<SubmissionId> {
        let rec = sqlx::query(
            "INSERT INTO submissions (participant_id, submitted_at) VALUES (?, ?) RETURNING id",
        )
        .bind(participant_id)
        .bind(submitted_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;
        let submission_id = SubmissionId(rec.get::<i64, _>(0));

        for result in results {
            sqlx::query(
                "INSERT INTO trial_results
                 (submission_id, dilemma_id, dilemma_title, choice, framework,
                  reaction_time_secs, recorded_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(submission_id.0)
            .bind(result.dilemma_id.0)
            .bind(&result.dilemma_title)
            .bind(result.choice.as_str())
            .bind(result.framework.as_str())
            .bind(result.reaction_time)
            .bind(result.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await?;
        }

        Ok(submission_id)
    }

    pub async fn list_submissions(&self) -> Result<Vec<SubmissionSummary>> {
        let rows = sqlx::query(
            "SELECT s.id, s.participant_id, s.submitted_at, COUNT(t.id) AS trial_count
             FROM submissions s
             LEFT JOIN trial_results t ON t.submission_id = s.id
             GROUP BY s.id
             ORDER BY s.id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SubmissionSummary {
                    submission_id: SubmissionId(row.get::<i64, _>("id")),
                    participant_id: row.get::<String, _>("participant_id"),
                    submitted_at: parse_timestamp(&row.get::<String, _>("submitted_at"))?,
                    trial_count: row.get::<i64, _>("trial_count"),
                })
            })
            .collect()
    }

    pub async fn submission(&self, submission_id: SubmissionId) -> Result<Option<SubmissionSummary>> {
        let row = sqlx::query(
            "SELECT s.id, s.participant_id, s.submitted_at, COUNT(t.id) AS trial_count
             FROM submissions s
             LEFT JOIN trial_results t ON t.submission_id = s.id
             WHERE s.id = ?
             GROUP BY s.id",
        )
        .bind(submission_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(SubmissionSummary {
                submission_id: SubmissionId(row.get::<i64, _>("id")),
                participant_id: row.get::<String, _>("participant_id"),
                submitted_at: parse_timestamp(&row.get::<String, _>("submitted_at"))?,
                trial_count: row.get::<i64, _>("trial_count"),
            })
        })
        .transpose()
    }

    pub async fn results_for_submission(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Vec<TrialResult>> {
        let rows = sqlx::query(
            "SELECT dilemma_id, dilemma_title, choice, framework, reaction_time_secs, recorded_at
             FROM trial_results
             WHERE submission_id = ?
             ORDER BY id",
        )
        .bind(submission_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(decode_trial_row).collect()
    }

    pub async fn results_for_participant(&self, participant_id: &str) -> Result<Vec<TrialResult>> {
        let rows = sqlx::query(
            "SELECT t.dilemma_id, t.dilemma_title, t.choice, t.framework,
                    t.reaction_time_secs, t.recorded_at
             FROM trial_results t
             JOIN submissions s ON s.id = t.submission_id
             WHERE s.participant_id = ?
             ORDER BY t.id",
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(decode_trial_row).collect()
    }

    /// Every stored trial across all submissions, joined with its
    /// participant. Feed for the aggregate analytics.
    pub async fn all_results(&self) -> Result<Vec<ParticipantTrial>> {
        let rows = sqlx::query(
            "SELECT s.participant_id, t.dilemma_id, t.dilemma_title, t.choice,
                    t.framework, t.reaction_time_secs, t.recorded_at
             FROM trial_results t
             JOIN submissions s ON s.id = t.submission_id
             ORDER BY t.id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ParticipantTrial {
                    participant_id: row.get::<String, _>("participant_id"),
                    result: decode_trial_row(row)?,
                })
            })
            .collect()
    }
}

fn decode_trial_row(row: &sqlx::sqlite::SqliteRow) -> Result<TrialResult> {
    let choice_raw = row.get::<String, _>("choice");
    let framework_raw = row.get::<String, _>("framework");
    Ok(TrialResult {
        dilemma_id: DilemmaId(row.get::<i64, _>("dilemma_id")),
        dilemma_title: row.get::<String, _>("dilemma_title"),
        choice: Side::parse(&choice_raw)
            .ok_or_else(|| anyhow!("unknown stored choice '{choice_raw}'"))?,
        framework: Framework::parse(&framework_raw)
            .ok_or_else(|| anyhow!("unknown stored framework '{framework_raw}'"))?,
        reaction_time: row.get::<f64, _>("reaction_time_secs"),
        timestamp: parse_timestamp(&row.get::<String, _>("recorded_at"))?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid stored timestamp '{raw}'"))?
        .with_timezone(&Utc))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(database_url) else {
        return Ok(());
    };
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;
    Ok(())
}

fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if path.is_empty() {
        return None;
    }
    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
