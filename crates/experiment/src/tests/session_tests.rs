use super::*;
use rand::{rngs::StdRng, SeedableRng};
use shared::domain::{Choice, DilemmaId, Framework};

fn choice(title: &str, framework: Framework) -> Choice {
    Choice {
        title: title.to_string(),
        description: format!("{title} description"),
        framework,
    }
}

fn dilemma(id: i64) -> Dilemma {
    Dilemma {
        id: DilemmaId(id),
        title: format!("Dilemma {id}"),
        description: "Choose.".into(),
        left_choice: choice("maximize", Framework::Utilitarian),
        right_choice: choice("uphold", Framework::Deontological),
    }
}

fn fixed_set(n: i64) -> Vec<Dilemma> {
    (1..=n).map(dilemma).collect()
}

fn side_for(session: &Session, framework: Framework) -> Side {
    let current = session.current_dilemma().expect("active trial");
    if current.left_choice.framework == framework {
        Side::Left
    } else {
        Side::Right
    }
}

#[test]
fn start_moves_welcome_to_trial_and_keeps_participant_id() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(1);
    session
        .start("alice", fixed_set(3), &mut rng)
        .expect("start");
    assert_eq!(session.view(), View::Trial);
    assert_eq!(session.participant_id(), "alice");
    assert_eq!(session.progress(), (0, 3));
}

#[test]
fn blank_participant_id_gets_timestamp_placeholder() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(1);
    session.start("   ", fixed_set(3), &mut rng).expect("start");
    assert!(session.participant_id().starts_with("participant_"));
}

#[test]
fn start_rejects_invalid_dilemma_sets() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(1);
    let err = session.start("alice", Vec::new(), &mut rng).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidDilemmas(DilemmaSetError::Empty)
    ));
    assert_eq!(session.view(), View::Welcome);
}

#[test]
fn start_twice_is_an_invalid_transition() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(1);
    session
        .start("alice", fixed_set(3), &mut rng)
        .expect("start");
    let err = session.start("bob", fixed_set(3), &mut rng).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            action: "start",
            state: View::Trial
        }
    ));
}

#[test]
fn responding_walks_every_trial_and_finishes_with_a_summary() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(7);
    session
        .start("alice", fixed_set(3), &mut rng)
        .expect("start");

    let first = side_for(&session, Framework::Utilitarian);
    match session.respond(first, 1.2).expect("respond") {
        Advance::NextTrial(_) => {}
        other => panic!("expected another trial, got {other:?}"),
    }

    let second = side_for(&session, Framework::Deontological);
    assert!(matches!(
        session.respond(second, 0.8).expect("respond"),
        Advance::NextTrial(_)
    ));

    let third = side_for(&session, Framework::Utilitarian);
    let summary = match session.respond(third, 2.0).expect("respond") {
        Advance::Finished(summary) => summary,
        other => panic!("expected the session to finish, got {other:?}"),
    };

    assert_eq!(session.view(), View::Results);
    assert_eq!(summary.total_trials, 3);
    assert!((summary.average_reaction_time - 4.0 / 3.0).abs() < 1e-9);
    assert!((summary.utilitarian_percentage - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(summary.classification, crate::scorer::Classification::Utilitarian);
    assert_eq!(session.results().len(), 3);
}

#[test]
fn recorded_framework_follows_the_chosen_side() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(11);
    session.start("alice", fixed_set(2), &mut rng).expect("start");

    let side = side_for(&session, Framework::Deontological);
    session.respond(side, 0.5).expect("respond");
    let recorded = &session.results()[0];
    assert_eq!(recorded.choice, side);
    assert_eq!(recorded.framework, Framework::Deontological);
    assert!((recorded.reaction_time - 0.5).abs() < f64::EPSILON);
}

#[test]
fn respond_outside_an_active_trial_fails_loudly() {
    let mut session = Session::new();
    let err = session.respond(Side::Left, 1.0).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            action: "respond",
            state: View::Welcome
        }
    ));

    let mut rng = StdRng::seed_from_u64(3);
    session.start("alice", fixed_set(1), &mut rng).expect("start");
    session.respond(Side::Left, 1.0).expect("finish");
    let err = session.respond(Side::Right, 1.0).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            action: "respond",
            state: View::Results
        }
    ));
}

#[test]
fn rejects_non_finite_and_negative_reaction_times() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(3);
    session.start("alice", fixed_set(2), &mut rng).expect("start");

    assert!(matches!(
        session.respond(Side::Left, -0.1).unwrap_err(),
        SessionError::InvalidReactionTime(_)
    ));
    assert!(matches!(
        session.respond(Side::Left, f64::NAN).unwrap_err(),
        SessionError::InvalidReactionTime(_)
    ));
    // The failed responses must not have consumed the trial.
    assert_eq!(session.progress(), (0, 2));
}

#[test]
fn reset_returns_a_finished_session_to_welcome() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(5);
    session.start("alice", fixed_set(1), &mut rng).expect("start");
    session.respond(Side::Left, 1.0).expect("finish");

    session.reset().expect("reset");
    assert_eq!(session.view(), View::Welcome);
    assert!(session.results().is_empty());
    assert!(session.participant_id().is_empty());

    // A fresh start must work after reset.
    session.start("bob", fixed_set(2), &mut rng).expect("restart");
    assert_eq!(session.view(), View::Trial);
}

#[test]
fn reset_mid_trial_is_an_invalid_transition() {
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(5);
    session.start("alice", fixed_set(2), &mut rng).expect("start");
    assert!(matches!(
        session.reset().unwrap_err(),
        SessionError::InvalidTransition {
            action: "reset",
            state: View::Trial
        }
    ));
}

#[test]
fn side_assignment_approaches_a_fifty_fifty_split() {
    let mut rng = StdRng::seed_from_u64(42);
    let passes = 2000;
    let mut utilitarian_on_left = 0;
    for _ in 0..passes {
        let mut set = fixed_set(1);
        randomize(&mut set, &mut rng);
        if set[0].left_choice.framework == Framework::Utilitarian {
            utilitarian_on_left += 1;
        }
    }
    let share = utilitarian_on_left as f64 / passes as f64;
    assert!(
        (0.45..=0.55).contains(&share),
        "side split drifted: {share}"
    );
}

#[test]
fn presentation_order_varies_across_passes() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut leading_ids = std::collections::HashSet::new();
    for _ in 0..100 {
        let mut set = fixed_set(5);
        randomize(&mut set, &mut rng);
        leading_ids.insert(set[0].id.0);
    }
    // Every dilemma should lead at least once over 100 shuffles of 5.
    assert_eq!(leading_ids.len(), 5);
}
