use super::*;
use chrono::TimeZone;

fn trial(id: i64, framework: Framework, reaction_time: f64) -> TrialResult {
    TrialResult {
        dilemma_id: DilemmaId(id),
        dilemma_title: format!("Dilemma {id}"),
        choice: Side::Left,
        framework,
        reaction_time,
        timestamp: Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn records_and_reads_back_a_submission() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let submitted_at = Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap();
    let results = vec![
        trial(1, Framework::Utilitarian, 1.2),
        trial(2, Framework::Deontological, 0.8),
    ];

    let submission_id = storage
        .record_submission("alice", submitted_at, &results)
        .await
        .expect("record");
    assert!(submission_id.0 > 0);

    let stored = storage
        .results_for_submission(submission_id)
        .await
        .expect("results");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].dilemma_id, DilemmaId(1));
    assert_eq!(stored[0].framework, Framework::Utilitarian);
    assert_eq!(stored[1].choice, Side::Left);
    assert!((stored[1].reaction_time - 0.8).abs() < f64::EPSILON);
    assert_eq!(stored[0].timestamp, results[0].timestamp);
}

#[tokio::test]
async fn lists_submissions_with_trial_counts() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let now = Utc.with_ymd_and_hms(2026, 8, 6, 11, 0, 0).unwrap();
    storage
        .record_submission("alice", now, &[trial(1, Framework::Utilitarian, 1.0)])
        .await
        .expect("first");
    storage
        .record_submission(
            "bob",
            now,
            &[
                trial(1, Framework::Deontological, 2.0),
                trial(2, Framework::Utilitarian, 1.5),
            ],
        )
        .await
        .expect("second");

    let submissions = storage.list_submissions().await.expect("list");
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].participant_id, "alice");
    assert_eq!(submissions[0].trial_count, 1);
    assert_eq!(submissions[1].participant_id, "bob");
    assert_eq!(submissions[1].trial_count, 2);
    assert_eq!(submissions[1].submitted_at, now);
}

#[tokio::test]
async fn fetches_single_submission_or_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let now = Utc.with_ymd_and_hms(2026, 8, 6, 11, 0, 0).unwrap();
    let id = storage
        .record_submission("alice", now, &[trial(1, Framework::Utilitarian, 1.0)])
        .await
        .expect("record");

    let found = storage.submission(id).await.expect("query");
    assert_eq!(found.expect("present").participant_id, "alice");

    let missing = storage.submission(SubmissionId(9999)).await.expect("query");
    assert!(missing.is_none());
}

#[tokio::test]
async fn aggregates_results_across_participants() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
    storage
        .record_submission("alice", now, &[trial(1, Framework::Utilitarian, 1.0)])
        .await
        .expect("alice");
    storage
        .record_submission("bob", now, &[trial(1, Framework::Deontological, 2.0)])
        .await
        .expect("bob");

    let all = storage.all_results().await.expect("all results");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].participant_id, "alice");
    assert_eq!(all[1].participant_id, "bob");
    assert_eq!(all[1].result.framework, Framework::Deontological);

    let alice_only = storage
        .results_for_participant("alice")
        .await
        .expect("participant results");
    assert_eq!(alice_only.len(), 1);
    assert_eq!(alice_only[0].framework, Framework::Utilitarian);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("temp dir");
    let db_path = temp_root.path().join("nested").join("results.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}
