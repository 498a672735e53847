//! Clinic-app API client: lab snapshot fetch and formulary search.
//!
//! Pure transport, same shape as the engine client. The caller decides
//! how to react to failures — notably the orchestrator tolerates a lab
//! fetch failure and the search session maps errors to empty results.

use serde::Deserialize;
use thiserror::Error;

use crate::config;
use crate::models::{DrugCandidate, RawLabRecord};
use crate::orchestrator::LabSource;
use crate::search::FormularyLookup;

#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("Records connection failed: {0}")]
    Connection(String),

    #[error("Records request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Records returned status {0}")]
    Status(u16),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Which lab table serves this patient view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabScope {
    Inpatient,
    Outpatient,
}

impl LabScope {
    fn path_segment(self) -> &'static str {
        match self {
            LabScope::Inpatient => "lab",
            LabScope::Outpatient => "op-lab",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DrugSearchEnvelope {
    #[serde(default)]
    drugs: Vec<DrugCandidate>,
}

pub struct RecordsClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
    lab_scope: LabScope,
}

impl RecordsClient {
    pub fn new(base_url: &str, timeout_secs: u64, lab_scope: LabScope) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            lab_scope,
        }
    }

    pub fn with_defaults(base_url: &str, lab_scope: LabScope) -> Self {
        Self::new(base_url, config::REQUEST_TIMEOUT_SECS, lab_scope)
    }

    pub fn from_endpoints(endpoints: &config::Endpoints, lab_scope: LabScope) -> Self {
        Self::with_defaults(&endpoints.records_base_url, lab_scope)
    }

    fn lab_url(&self, patient_id: i64) -> String {
        format!(
            "{}/api/{}/{}",
            self.base_url,
            self.lab_scope.path_segment(),
            patient_id
        )
    }

    fn search_url(&self) -> String {
        format!("{}/api/drug-inventory/search", self.base_url)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> RecordsError {
        if error.is_timeout() {
            RecordsError::Timeout(self.timeout_secs)
        } else if error.is_connect() {
            RecordsError::Connection(self.base_url.clone())
        } else {
            RecordsError::Http(error.to_string())
        }
    }
}

impl LabSource for RecordsClient {
    async fn fetch_labs(&self, patient_id: i64) -> Result<Option<RawLabRecord>, RecordsError> {
        let response = self
            .client
            .get(self.lab_url(patient_id))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        // No snapshot recorded yet is a normal condition, not a failure.
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RecordsError::Status(status.as_u16()));
        }

        response
            .json::<RawLabRecord>()
            .await
            .map(Some)
            .map_err(|e| RecordsError::ResponseParsing(e.to_string()))
    }
}

impl FormularyLookup for RecordsClient {
    async fn search(&self, query: &str) -> Result<Vec<DrugCandidate>, RecordsError> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecordsError::Status(status.as_u16()));
        }

        response
            .json::<DrugSearchEnvelope>()
            .await
            .map(|envelope| envelope.drugs)
            .map_err(|e| RecordsError::ResponseParsing(e.to_string()))
    }
}
