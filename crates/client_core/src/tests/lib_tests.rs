use super::*;
use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use chrono::Utc;
use shared::domain::{Choice, DilemmaId, Framework, Side, TrialResult};
use std::sync::{Arc, Mutex};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn remote_set() -> Vec<Dilemma> {
    vec![Dilemma {
        id: DilemmaId(99),
        title: "Served from the test server".into(),
        description: "Choose.".into(),
        left_choice: Choice {
            title: "l".into(),
            description: "ld".into(),
            framework: Framework::Utilitarian,
        },
        right_choice: Choice {
            title: "r".into(),
            description: "rd".into(),
            framework: Framework::Deontological,
        },
    }]
}

fn sample_request() -> SubmitResultsRequest {
    SubmitResultsRequest {
        participant_id: "alice".into(),
        results: vec![TrialResult {
            dilemma_id: DilemmaId(1),
            dilemma_title: "t".into(),
            choice: Side::Left,
            framework: Framework::Utilitarian,
            reaction_time: 1.2,
            timestamp: Utc::now(),
        }],
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn loads_the_served_dilemma_set() {
    let router = Router::new().route("/api/dilemmas", get(|| async { Json(remote_set()) }));
    let url = serve(router).await;

    let client = ExperimentClient::new(url).expect("client");
    let dilemmas = client.load().await;
    assert_eq!(dilemmas.len(), 1);
    assert_eq!(dilemmas[0].id, DilemmaId(99));
}

#[tokio::test]
async fn server_error_falls_back_to_builtin_catalog() {
    let router = Router::new().route(
        "/api/dilemmas",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let url = serve(router).await;

    let client = ExperimentClient::new(url).expect("client");
    let dilemmas = client.load().await;
    assert!(dilemmas.len() >= 8);
    assert_eq!(dilemmas[0].title, builtin_dilemmas()[0].title);
}

#[tokio::test]
async fn malformed_payload_falls_back_to_builtin_catalog() {
    let router = Router::new().route("/api/dilemmas", get(|| async { "not json" }));
    let url = serve(router).await;

    let client = ExperimentClient::new(url).expect("client");
    assert_eq!(client.load().await.len(), builtin_dilemmas().len());
}

#[tokio::test]
async fn invalid_dilemma_set_falls_back_to_builtin_catalog() {
    // Both choices utilitarian: passes deserialization, fails validation.
    let mut bad = remote_set();
    bad[0].right_choice.framework = Framework::Utilitarian;
    let router = Router::new().route("/api/dilemmas", get(move || async move { Json(bad) }));
    let url = serve(router).await;

    let client = ExperimentClient::new(url).expect("client");
    assert_eq!(client.load().await.len(), builtin_dilemmas().len());
}

#[tokio::test]
async fn unreachable_server_falls_back_to_builtin_catalog() {
    let client = ExperimentClient::new("http://127.0.0.1:1").expect("client");
    assert_eq!(client.load().await.len(), builtin_dilemmas().len());
}

#[tokio::test]
async fn builtin_source_serves_the_catalog_offline() {
    let dilemmas = BuiltinDilemmaSource.load().await;
    assert_eq!(dilemmas.len(), builtin_dilemmas().len());
}

#[tokio::test]
async fn submits_results_and_returns_the_stored_id() {
    type Seen = Arc<Mutex<Option<SubmitResultsRequest>>>;
    let seen: Seen = Arc::new(Mutex::new(None));

    async fn accept(
        State(seen): State<Seen>,
        Json(request): Json<SubmitResultsRequest>,
    ) -> Json<SubmitResultsResponse> {
        *seen.lock().expect("lock") = Some(request);
        Json(SubmitResultsResponse {
            submission_id: 42,
            report_path: None,
        })
    }

    let router = Router::new()
        .route("/api/results", post(accept))
        .with_state(seen.clone());
    let url = serve(router).await;

    let client = ExperimentClient::new(url).expect("client");
    let response = client.submit_results(&sample_request()).await;
    assert_eq!(response.expect("accepted").submission_id, 42);

    let received = seen.lock().expect("lock").clone().expect("request seen");
    assert_eq!(received.participant_id, "alice");
    assert_eq!(received.results.len(), 1);
}

#[tokio::test]
async fn failed_submission_is_swallowed_after_logging() {
    let router = Router::new().route(
        "/api/results",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let url = serve(router).await;

    let client = ExperimentClient::new(url).expect("client");
    assert!(client.submit_results(&sample_request()).await.is_none());
}
