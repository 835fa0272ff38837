use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use experiment::scorer::{summarize, ScoreError};
use shared::{
    dilemmas::builtin_dilemmas,
    domain::{validate_dilemma_set, Dilemma},
    error::{ApiError, ErrorCode},
    protocol::{SubmitResultsRequest, SubmitResultsResponse},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

mod config;
mod report;

use config::{load_settings, prepare_database_url};

const MAX_SUBMISSION_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
struct AppState {
    storage: Storage,
    dilemmas: Vec<Dilemma>,
    results_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let dilemmas = builtin_dilemmas();
    validate_dilemma_set(&dilemmas)?;

    let state = AppState {
        storage,
        dilemmas,
        results_dir: settings.results_dir.clone(),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, results_dir = %settings.results_dir.display(), "experiment server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/dilemmas", get(get_dilemmas))
        .route("/api/results", post(post_results))
        .layer(RequestBodyLimitLayer::new(MAX_SUBMISSION_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_dilemmas(State(state): State<Arc<AppState>>) -> Json<Vec<Dilemma>> {
    Json(state.dilemmas.clone())
}

async fn post_results(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitResultsRequest>,
) -> Result<Json<SubmitResultsResponse>, (StatusCode, Json<ApiError>)> {
    if req.participant_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                "participant id cannot be blank",
            )),
        ));
    }
    if let Some(bad) = req
        .results
        .iter()
        .find(|r| !r.reaction_time.is_finite() || r.reaction_time < 0.0)
    {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                format!(
                    "reaction time for dilemma {} must be a finite non-negative number",
                    bad.dilemma_id.0
                ),
            )),
        ));
    }

    let summary = summarize(&req.results).map_err(|e| match e {
        ScoreError::EmptyResults => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                "results cannot be empty",
            )),
        ),
    })?;

    let submission_id = state
        .storage
        .record_submission(&req.participant_id, req.timestamp, &req.results)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, e.to_string())),
            )
        })?;

    // The SQLite row is the durable copy; a report-file failure is
    // logged and the submission still succeeds.
    let report_path = match report::write_reports(
        &state.results_dir,
        &req.participant_id,
        req.timestamp,
        &req.results,
        &summary,
    ) {
        Ok(path) => Some(path.to_string_lossy().into_owned()),
        Err(error) => {
            warn!(%error, submission_id = submission_id.0, "failed to write report files");
            None
        }
    };

    info!(
        submission_id = submission_id.0,
        participant_id = %req.participant_id,
        trials = req.results.len(),
        classification = summary.classification.label(),
        "stored submission"
    );

    Ok(Json(SubmitResultsResponse {
        submission_id: submission_id.0,
        report_path,
    }))
}
