use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};
use shared::domain::{validate_dilemma_set, Dilemma, DilemmaSetError, Side, TrialResult};
use thiserror::Error;

use crate::scorer::{summarize, ScoreError, SummaryStatistics};

/// View the presentation layer should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Welcome,
    Trial,
    Results,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} from the {state:?} state")]
    InvalidTransition { action: &'static str, state: View },
    #[error("reaction time must be a finite non-negative number of seconds, got {0}")]
    InvalidReactionTime(f64),
    #[error(transparent)]
    InvalidDilemmas(#[from] DilemmaSetError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// What happened after a response was recorded.
#[derive(Debug)]
pub enum Advance<'a> {
    NextTrial(&'a Dilemma),
    Finished(SummaryStatistics),
}

/// Maps a choice plus elapsed time into an immutable trial result.
/// Pure function of its inputs; the session owns the accumulator.
pub fn record(
    dilemma: &Dilemma,
    side: Side,
    reaction_time: f64,
    timestamp: DateTime<Utc>,
) -> TrialResult {
    let choice = dilemma.choice(side);
    TrialResult {
        dilemma_id: dilemma.id,
        dilemma_title: dilemma.title.clone(),
        choice: side,
        framework: choice.framework,
        reaction_time,
        timestamp,
    }
}

/// One participant's pass through the experiment.
///
/// State machine: `Welcome -> Trial -> Results`, back to `Welcome` via
/// [`Session::reset`]. Responding outside an active trial is an
/// integration fault and fails loudly rather than being ignored.
pub struct Session {
    participant_id: String,
    dilemmas: Vec<Dilemma>,
    current: usize,
    results: Vec<TrialResult>,
    view: View,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            participant_id: String::new(),
            dilemmas: Vec::new(),
            current: 0,
            results: Vec::new(),
            view: View::Welcome,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    /// (answered, total) for progress display.
    pub fn progress(&self) -> (usize, usize) {
        (self.current, self.dilemmas.len())
    }

    /// Validates and randomizes the dilemma set, resets the accumulator,
    /// and enters the first trial. A blank participant id gets a
    /// timestamp-derived placeholder.
    pub fn start<R: Rng>(
        &mut self,
        participant_id: &str,
        mut dilemmas: Vec<Dilemma>,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        if self.view != View::Welcome {
            return Err(SessionError::InvalidTransition {
                action: "start",
                state: self.view,
            });
        }
        validate_dilemma_set(&dilemmas)?;
        randomize(&mut dilemmas, rng);

        let participant_id = participant_id.trim();
        self.participant_id = if participant_id.is_empty() {
            default_participant_id(Utc::now())
        } else {
            participant_id.to_string()
        };
        self.dilemmas = dilemmas;
        self.current = 0;
        self.results.clear();
        self.view = View::Trial;
        Ok(())
    }

    /// The dilemma to present for the current trial. The caller resets
    /// its trial timer when it actually puts this on screen.
    pub fn current_dilemma(&self) -> Result<&Dilemma, SessionError> {
        if self.view != View::Trial {
            return Err(SessionError::InvalidTransition {
                action: "present a trial",
                state: self.view,
            });
        }
        Ok(&self.dilemmas[self.current])
    }

    /// Records the response for the current trial and advances. On the
    /// last trial the session moves to `Results` and the summary is
    /// computed.
    pub fn respond(&mut self, side: Side, reaction_time: f64) -> Result<Advance<'_>, SessionError> {
        if self.view != View::Trial {
            return Err(SessionError::InvalidTransition {
                action: "respond",
                state: self.view,
            });
        }
        if !reaction_time.is_finite() || reaction_time < 0.0 {
            return Err(SessionError::InvalidReactionTime(reaction_time));
        }

        let dilemma = &self.dilemmas[self.current];
        self.results.push(record(dilemma, side, reaction_time, Utc::now()));
        self.current += 1;

        if self.current < self.dilemmas.len() {
            Ok(Advance::NextTrial(&self.dilemmas[self.current]))
        } else {
            self.view = View::Results;
            let summary = summarize(&self.results)?;
            Ok(Advance::Finished(summary))
        }
    }

    /// Back to the welcome view, dropping the finished session's data.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.view != View::Results {
            return Err(SessionError::InvalidTransition {
                action: "reset",
                state: self.view,
            });
        }
        self.participant_id.clear();
        self.dilemmas.clear();
        self.current = 0;
        self.results.clear();
        self.view = View::Welcome;
        Ok(())
    }
}

/// Unbiased Fisher-Yates shuffle of presentation order, then an
/// independent coin flip per dilemma deciding whether its choices swap
/// screen sides.
fn randomize<R: Rng>(dilemmas: &mut [Dilemma], rng: &mut R) {
    dilemmas.shuffle(rng);
    for dilemma in dilemmas.iter_mut() {
        if rng.gen_bool(0.5) {
            dilemma.swap_sides();
        }
    }
}

fn default_participant_id(now: DateTime<Utc>) -> String {
    format!("participant_{}", now.timestamp_millis())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
