use serde::{Deserialize, Serialize};
use shared::domain::{Framework, TrialResult};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("cannot summarize an empty result set")]
    EmptyResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Utilitarian,
    Deontological,
    Mixed,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Utilitarian => "Utilitarian",
            Classification::Deontological => "Deontological",
            Classification::Mixed => "Mixed",
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            Classification::Utilitarian => {
                "Your choices leaned toward outcomes: you tended to pick the option \
                 that maximized overall well-being, even when it meant bending a rule."
            }
            Classification::Deontological => {
                "Your choices leaned toward principles: you tended to pick the option \
                 that upheld rules and duties, even at a cost to overall outcomes."
            }
            Classification::Mixed => {
                "Your choices balanced outcomes against principles, without a strong \
                 leaning toward either framework."
            }
        }
    }
}

/// Aggregate statistics derived from a finished session's results.
/// Recomputed on demand, never stored independently of its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    pub total_trials: usize,
    pub average_reaction_time: f64,
    pub utilitarian_percentage: f64,
    pub deontological_percentage: f64,
    pub classification: Classification,
}

impl SummaryStatistics {
    pub fn explanation(&self) -> &'static str {
        self.classification.explanation()
    }
}

/// Strict thresholds: exactly 60 or 40 percent falls into `Mixed`.
pub fn classify(utilitarian_percentage: f64) -> Classification {
    if utilitarian_percentage > 60.0 {
        Classification::Utilitarian
    } else if utilitarian_percentage < 40.0 {
        Classification::Deontological
    } else {
        Classification::Mixed
    }
}

/// Derives summary statistics from recorded trials. An empty result set
/// is an explicit error, never a NaN smuggled into the output.
pub fn summarize(results: &[TrialResult]) -> Result<SummaryStatistics, ScoreError> {
    if results.is_empty() {
        return Err(ScoreError::EmptyResults);
    }
    let total = results.len();
    let utilitarian = results
        .iter()
        .filter(|r| r.framework == Framework::Utilitarian)
        .count();
    let utilitarian_percentage = utilitarian as f64 / total as f64 * 100.0;
    let deontological_percentage = 100.0 - utilitarian_percentage;
    let average_reaction_time =
        results.iter().map(|r| r.reaction_time).sum::<f64>() / total as f64;

    Ok(SummaryStatistics {
        total_trials: total,
        average_reaction_time,
        utilitarian_percentage,
        deontological_percentage,
        classification: classify(utilitarian_percentage),
    })
}
