//! Aggregate statistics over stored submissions: per-dilemma splits,
//! per-participant tendencies, reaction-time distribution, and the
//! combined JSON report. Pure functions over [`ParticipantTrial`] rows;
//! the operator CLI decides where the output goes.

use std::collections::BTreeMap;

use experiment::scorer::{classify, Classification, ScoreError};
use serde::Serialize;
use shared::domain::{DilemmaId, Framework, ParticipantTrial};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionTimeStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DilemmaBreakdown {
    pub dilemma_id: DilemmaId,
    pub dilemma_title: String,
    pub total: usize,
    pub utilitarian: usize,
    pub deontological: usize,
    pub utilitarian_percentage: f64,
    pub deontological_percentage: f64,
    pub mean_reaction_time: f64,
    /// Standard deviation of the choice indicator; peaks at 0.5 when a
    /// dilemma splits participants evenly.
    pub disagreement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    pub participant_id: String,
    pub total_trials: usize,
    pub utilitarian: usize,
    pub deontological: usize,
    pub utilitarian_percentage: f64,
    pub deontological_percentage: f64,
    pub average_reaction_time: f64,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCounts {
    pub utilitarian_dominant: usize,
    pub deontological_dominant: usize,
    pub mixed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub total_participants: usize,
    pub total_responses: usize,
    pub utilitarian_percentage: f64,
    pub deontological_percentage: f64,
    pub reaction_times: ReactionTimeStats,
    pub participant_classifications: ClassificationCounts,
    pub dilemmas: Vec<DilemmaBreakdown>,
    pub high_disagreement: Vec<DilemmaBreakdown>,
}

pub fn reaction_time_stats(trials: &[ParticipantTrial]) -> Result<ReactionTimeStats, ScoreError> {
    if trials.is_empty() {
        return Err(ScoreError::EmptyResults);
    }
    let mut times: Vec<f64> = trials.iter().map(|t| t.result.reaction_time).collect();
    times.sort_by(|a, b| a.total_cmp(b));

    let n = times.len();
    let mean = times.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        times[n / 2]
    } else {
        (times[n / 2 - 1] + times[n / 2]) / 2.0
    };
    let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n as f64;

    Ok(ReactionTimeStats {
        mean,
        median,
        std_dev: variance.sqrt(),
        min: times[0],
        max: times[n - 1],
    })
}

pub fn dilemma_breakdown(trials: &[ParticipantTrial]) -> Result<Vec<DilemmaBreakdown>, ScoreError> {
    if trials.is_empty() {
        return Err(ScoreError::EmptyResults);
    }

    struct Acc {
        title: String,
        utilitarian: usize,
        total: usize,
        reaction_time_sum: f64,
    }

    let mut by_dilemma: BTreeMap<i64, Acc> = BTreeMap::new();
    for trial in trials {
        let acc = by_dilemma
            .entry(trial.result.dilemma_id.0)
            .or_insert_with(|| Acc {
                title: trial.result.dilemma_title.clone(),
                utilitarian: 0,
                total: 0,
                reaction_time_sum: 0.0,
            });
        acc.total += 1;
        acc.reaction_time_sum += trial.result.reaction_time;
        if trial.result.framework == Framework::Utilitarian {
            acc.utilitarian += 1;
        }
    }

    Ok(by_dilemma
        .into_iter()
        .map(|(id, acc)| {
            let share = acc.utilitarian as f64 / acc.total as f64;
            let utilitarian_percentage = share * 100.0;
            DilemmaBreakdown {
                dilemma_id: DilemmaId(id),
                dilemma_title: acc.title,
                total: acc.total,
                utilitarian: acc.utilitarian,
                deontological: acc.total - acc.utilitarian,
                utilitarian_percentage,
                deontological_percentage: 100.0 - utilitarian_percentage,
                mean_reaction_time: acc.reaction_time_sum / acc.total as f64,
                disagreement: (share * (1.0 - share)).sqrt(),
            }
        })
        .collect())
}

pub fn participant_profiles(
    trials: &[ParticipantTrial],
) -> Result<Vec<ParticipantProfile>, ScoreError> {
    if trials.is_empty() {
        return Err(ScoreError::EmptyResults);
    }

    struct Acc {
        utilitarian: usize,
        total: usize,
        reaction_time_sum: f64,
    }

    let mut by_participant: BTreeMap<String, Acc> = BTreeMap::new();
    for trial in trials {
        let acc = by_participant
            .entry(trial.participant_id.clone())
            .or_insert_with(|| Acc {
                utilitarian: 0,
                total: 0,
                reaction_time_sum: 0.0,
            });
        acc.total += 1;
        acc.reaction_time_sum += trial.result.reaction_time;
        if trial.result.framework == Framework::Utilitarian {
            acc.utilitarian += 1;
        }
    }

    Ok(by_participant
        .into_iter()
        .map(|(participant_id, acc)| {
            let utilitarian_percentage = acc.utilitarian as f64 / acc.total as f64 * 100.0;
            ParticipantProfile {
                participant_id,
                total_trials: acc.total,
                utilitarian: acc.utilitarian,
                deontological: acc.total - acc.utilitarian,
                utilitarian_percentage,
                deontological_percentage: 100.0 - utilitarian_percentage,
                average_reaction_time: acc.reaction_time_sum / acc.total as f64,
                classification: classify(utilitarian_percentage),
            }
        })
        .collect())
}

/// The combined report the results viewer renders and exports as JSON.
pub fn build_report(trials: &[ParticipantTrial]) -> Result<AggregateReport, ScoreError> {
    let reaction_times = reaction_time_stats(trials)?;
    let dilemmas = dilemma_breakdown(trials)?;
    let profiles = participant_profiles(trials)?;

    let total_responses = trials.len();
    let utilitarian = trials
        .iter()
        .filter(|t| t.result.framework == Framework::Utilitarian)
        .count();
    let utilitarian_percentage = utilitarian as f64 / total_responses as f64 * 100.0;

    let mut counts = ClassificationCounts {
        utilitarian_dominant: 0,
        deontological_dominant: 0,
        mixed: 0,
    };
    for profile in &profiles {
        match profile.classification {
            Classification::Utilitarian => counts.utilitarian_dominant += 1,
            Classification::Deontological => counts.deontological_dominant += 1,
            Classification::Mixed => counts.mixed += 1,
        }
    }

    let mut high_disagreement = dilemmas.clone();
    high_disagreement.sort_by(|a, b| b.disagreement.total_cmp(&a.disagreement));
    high_disagreement.truncate(3);

    Ok(AggregateReport {
        total_participants: profiles.len(),
        total_responses,
        utilitarian_percentage,
        deontological_percentage: 100.0 - utilitarian_percentage,
        reaction_times,
        participant_classifications: counts,
        dilemmas,
        high_disagreement,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
