use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(DilemmaId);
id_newtype!(SubmissionId);

/// The two ethical frameworks a choice can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    Utilitarian,
    Deontological,
}

impl Framework {
    pub fn opposite(self) -> Self {
        match self {
            Framework::Utilitarian => Framework::Deontological,
            Framework::Deontological => Framework::Utilitarian,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Framework::Utilitarian => "utilitarian",
            Framework::Deontological => "deontological",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "utilitarian" => Some(Framework::Utilitarian),
            "deontological" => Some(Framework::Deontological),
            _ => None,
        }
    }
}

/// Screen side a choice was presented on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub title: String,
    pub description: String,
    pub framework: Framework,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dilemma {
    pub id: DilemmaId,
    pub title: String,
    pub description: String,
    pub left_choice: Choice,
    pub right_choice: Choice,
}

impl Dilemma {
    pub fn choice(&self, side: Side) -> &Choice {
        match side {
            Side::Left => &self.left_choice,
            Side::Right => &self.right_choice,
        }
    }

    /// Swaps which choice sits on which screen side. The framework tags
    /// travel with the choices, so side stays decorrelated from framework.
    pub fn swap_sides(&mut self) {
        std::mem::swap(&mut self.left_choice, &mut self.right_choice);
    }

    pub fn validate(&self) -> Result<(), DilemmaSetError> {
        if self.right_choice.framework != self.left_choice.framework.opposite() {
            return Err(DilemmaSetError::MatchingFrameworks {
                id: self.id.0,
                title: self.title.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DilemmaSetError {
    #[error("dilemma set is empty")]
    Empty,
    #[error("duplicate dilemma id {0}")]
    DuplicateId(i64),
    #[error("dilemma {id} ('{title}') must pair one utilitarian and one deontological choice")]
    MatchingFrameworks { id: i64, title: String },
}

/// Load-time validation for a dilemma set: non-empty, unique ids, and
/// every dilemma pairing opposite framework tags. The scoring model is
/// meaningless without the last invariant.
pub fn validate_dilemma_set(dilemmas: &[Dilemma]) -> Result<(), DilemmaSetError> {
    if dilemmas.is_empty() {
        return Err(DilemmaSetError::Empty);
    }
    let mut seen = HashSet::new();
    for dilemma in dilemmas {
        if !seen.insert(dilemma.id) {
            return Err(DilemmaSetError::DuplicateId(dilemma.id.0));
        }
        dilemma.validate()?;
    }
    Ok(())
}

/// One answered trial. Created once per trial and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    pub dilemma_id: DilemmaId,
    pub dilemma_title: String,
    pub choice: Side,
    pub framework: Framework,
    /// Seconds from presentation to response.
    pub reaction_time: f64,
    pub timestamp: DateTime<Utc>,
}

/// A stored trial joined with the participant who produced it, the unit
/// the aggregate analytics operate over.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantTrial {
    pub participant_id: String,
    pub result: TrialResult,
}
