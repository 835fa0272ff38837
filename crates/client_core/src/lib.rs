//! Participant-side networking: fetching the dilemma set and shipping
//! finished results to the experiment server. Both calls carry bounded
//! timeouts; neither failure mode is allowed to break the session flow.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    dilemmas::builtin_dilemmas,
    domain::{validate_dilemma_set, Dilemma},
    protocol::{SubmitResultsRequest, SubmitResultsResponse},
};
use tracing::{info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Supplies the ordered dilemma set a session runs over.
#[async_trait]
pub trait DilemmaSource: Send + Sync {
    /// Never fails from the caller's perspective; implementations fall
    /// back internally and log the cause.
    async fn load(&self) -> Vec<Dilemma>;
}

/// Offline source backed by the built-in catalog.
pub struct BuiltinDilemmaSource;

#[async_trait]
impl DilemmaSource for BuiltinDilemmaSource {
    async fn load(&self) -> Vec<Dilemma> {
        builtin_dilemmas()
    }
}

pub struct ExperimentClient {
    http: Client,
    server_url: String,
}

impl ExperimentClient {
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            server_url: server_url.into(),
        })
    }

    async fn fetch_dilemmas(&self) -> Result<Vec<Dilemma>> {
        let dilemmas: Vec<Dilemma> = self
            .http
            .get(format!("{}/api/dilemmas", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        validate_dilemma_set(&dilemmas)?;
        Ok(dilemmas)
    }

    /// Ships a finished session to the server. A failure is logged and
    /// swallowed; the participant keeps their local CSV either way, so
    /// there is no retry.
    pub async fn submit_results(&self, request: &SubmitResultsRequest) -> Option<SubmitResultsResponse> {
        let outcome = async {
            let response: SubmitResultsResponse = self
                .http
                .post(format!("{}/api/results", self.server_url))
                .json(request)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            anyhow::Ok(response)
        }
        .await;

        match outcome {
            Ok(response) => {
                info!(
                    submission_id = response.submission_id,
                    "results stored server-side"
                );
                Some(response)
            }
            Err(error) => {
                warn!(%error, "result submission failed; keeping local copy only");
                None
            }
        }
    }
}

#[async_trait]
impl DilemmaSource for ExperimentClient {
    async fn load(&self) -> Vec<Dilemma> {
        match self.fetch_dilemmas().await {
            Ok(dilemmas) => dilemmas,
            Err(error) => {
                warn!(%error, "dilemma fetch failed; using built-in catalog");
                builtin_dilemmas()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
