//! Analysis Orchestrator — owns the lifecycle of one safety-analysis
//! run per patient view.
//!
//! Analysis never fires on data mutation. It runs only on an explicit
//! clinician action ("Done / Re-analyse"), and only when the medication
//! list is non-empty: the engine call is slow and expensive, so the
//! trigger policy is a deliberate cost control. While a run is in
//! flight, re-triggering is rejected at the API level, not just in the
//! UI. The quick pair check and single-drug validator are side channels
//! that bypass the lifecycle entirely.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::context::build_patient_context;
use crate::engine::types::{
    AnalysisRequest, AnalysisResult, DosingRequest, DosingResponse, DrugValidation, PairCheck,
};
use crate::engine::EngineError;
use crate::models::{MedicationEntry, RawLabRecord, RawPatientRecord};
use crate::records::RecordsError;

/// Message shown when the engine could not be reached and reported no
/// detail of its own.
pub(crate) const CONNECTIVITY_MESSAGE: &str =
    "Could not reach the safety analysis service. Check the connection and try again.";

/// Transport seam to the analysis engine. `EngineClient` is the HTTP
/// implementation; tests substitute mocks.
pub trait AnalysisBackend: Send + Sync {
    fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisResult, EngineError>> + Send;

    fn check_drug_pair(
        &self,
        drug1: &str,
        drug2: &str,
    ) -> impl Future<Output = Result<PairCheck, EngineError>> + Send;

    fn validate_drug(
        &self,
        drug_name: &str,
    ) -> impl Future<Output = Result<DrugValidation, EngineError>> + Send;

    fn dosing(
        &self,
        request: &DosingRequest,
    ) -> impl Future<Output = Result<DosingResponse, EngineError>> + Send;
}

/// Lab snapshot source for request assembly. A fetch failure is
/// tolerated by the orchestrator, never fatal to the run.
pub trait LabSource: Send + Sync {
    fn fetch_labs(
        &self,
        patient_id: i64,
    ) -> impl Future<Output = Result<Option<RawLabRecord>, RecordsError>> + Send;
}

/// Observable lifecycle of the current analysis run.
#[derive(Debug, Clone, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Loading,
    Success(Arc<AnalysisResult>),
    Error(String),
}

impl AnalysisState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading)
    }

    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        match self {
            AnalysisState::Success(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum OrchestratorError {
    #[error("Medication list is empty, nothing to analyse")]
    EmptyMedicationList,

    #[error("An analysis is already in flight for this patient view")]
    AnalysisInFlight,

    #[error("{0}")]
    AnalysisFailed(String),
}

/// Everything the prescribing screen hands over on an explicit trigger.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub patient_id: i64,
    pub patient: RawPatientRecord,
    pub medications: Vec<MedicationEntry>,
    pub primary_diagnosis: String,
    pub secondary_diagnosis: String,
    pub preferred_language: Option<String>,
}

pub struct AnalysisOrchestrator<E, L> {
    backend: E,
    labs: L,
    state: Mutex<AnalysisState>,
    run_token: AtomicU64,
}

impl<E: AnalysisBackend, L: LabSource> AnalysisOrchestrator<E, L> {
    pub fn new(backend: E, labs: L) -> Self {
        Self {
            backend,
            labs,
            state: Mutex::new(AnalysisState::Idle),
            run_token: AtomicU64::new(0),
        }
    }

    /// Current lifecycle state. Success holds the result behind an Arc,
    /// so cloning the state is cheap.
    pub fn state(&self) -> AnalysisState {
        self.state.lock().expect("state lock poisoned").clone()
    }

    /// Drop any current result and invalidate in-flight writes. Call
    /// when the patient view changes.
    pub fn reset(&self) {
        self.run_token.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().expect("state lock poisoned") = AnalysisState::Idle;
    }

    /// Run one full analysis. Explicit trigger only; rejected while a
    /// run is in flight and when the medication list is empty.
    ///
    /// A successful run replaces the previous result wholesale. On
    /// failure the state carries the engine's `detail` when it sent
    /// one, otherwise a generic connectivity message, and the same call
    /// can simply be retried.
    pub async fn analyze(
        &self,
        input: AnalysisInput,
    ) -> Result<Arc<AnalysisResult>, OrchestratorError> {
        if input.medications.is_empty() {
            return Err(OrchestratorError::EmptyMedicationList);
        }
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            if state.is_loading() {
                return Err(OrchestratorError::AnalysisInFlight);
            }
            *state = AnalysisState::Loading;
        }
        let token = self.run_token.fetch_add(1, Ordering::SeqCst) + 1;

        // Lab fetch failure must not abort the analysis: the context is
        // simply built without labs.
        let lab_record = match self.labs.fetch_labs(input.patient_id).await {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(patient_id = input.patient_id, %error,
                    "lab snapshot fetch failed, analysing without labs");
                None
            }
        };

        let request = build_analysis_request(&input, lab_record.as_ref());
        tracing::info!(
            patient_id = input.patient_id,
            medications = request.medications.len(),
            diseases = request.diseases.len(),
            "safety analysis started"
        );

        match self.backend.analyze(&request).await {
            Ok(result) => {
                let result = Arc::new(result);
                if self.commit(token, AnalysisState::Success(result.clone())) {
                    tracing::info!(
                        patient_id = input.patient_id,
                        drug_drug = result.drug_drug.len(),
                        "safety analysis finished"
                    );
                }
                Ok(result)
            }
            Err(error) => {
                let message = failure_message(&error);
                self.commit(token, AnalysisState::Error(message.clone()));
                Err(OrchestratorError::AnalysisFailed(message))
            }
        }
    }

    /// Quick pairwise check. Ungated: runs regardless of the main
    /// lifecycle, including while a full analysis is loading.
    pub async fn check_drug_pair(
        &self,
        drug1: &str,
        drug2: &str,
    ) -> Result<PairCheck, EngineError> {
        self.backend.check_drug_pair(drug1, drug2).await
    }

    /// Single-drug name validation. Ungated, same as the pair check.
    pub async fn validate_drug(&self, drug_name: &str) -> Result<DrugValidation, EngineError> {
        self.backend.validate_drug(drug_name).await
    }

    /// Dosing-only analysis. Ungated side channel.
    pub async fn dosing(&self, request: &DosingRequest) -> Result<DosingResponse, EngineError> {
        self.backend.dosing(request).await
    }

    /// Write an outcome only if no newer run or reset superseded it.
    fn commit(&self, token: u64, outcome: AnalysisState) -> bool {
        let mut state = self.state.lock().expect("state lock poisoned");
        if token == self.run_token.load(Ordering::SeqCst) {
            *state = outcome;
            true
        } else {
            tracing::debug!(token, "stale analysis outcome discarded");
            false
        }
    }
}

fn failure_message(error: &EngineError) -> String {
    match error.detail() {
        Some(detail) => detail.to_string(),
        None => CONNECTIVITY_MESSAGE.to_string(),
    }
}

/// Assemble the engine request from the trigger input. Rebuilt fresh on
/// every trigger; nothing here is cached between runs.
pub fn build_analysis_request(
    input: &AnalysisInput,
    labs: Option<&RawLabRecord>,
) -> AnalysisRequest {
    let context = build_patient_context(&input.patient, labs);
    AnalysisRequest {
        medications: medication_names(&input.medications),
        diseases: split_diseases(&input.primary_diagnosis, &input.secondary_diagnosis),
        age: input.patient.age,
        sex: input.patient.sex.clone(),
        dose_map: build_dose_map(&input.medications),
        patient_profile: context.profile,
        patient_labs: context.labs,
        preferred_language: input
            .preferred_language
            .clone()
            .or_else(|| input.patient.preferred_language.clone()),
    }
}

/// Comma-split the free-text primary and secondary diagnoses, trimming
/// and dropping empties.
pub fn split_diseases(primary: &str, secondary: &str) -> Vec<String> {
    primary
        .split(',')
        .chain(secondary.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fold strength and frequency into one display string per generic
/// name. Entries without a generic name stay out of the map but still
/// reach the engine through the plain medication-name list.
pub fn build_dose_map(
    medications: &[MedicationEntry],
) -> std::collections::BTreeMap<String, String> {
    let mut map = std::collections::BTreeMap::new();
    for entry in medications {
        let generic = entry.generic_name.trim();
        if generic.is_empty() {
            continue;
        }
        let dose = [entry.strength.trim(), entry.frequency.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        map.insert(generic.to_string(), dose);
    }
    map
}

fn medication_names(medications: &[MedicationEntry]) -> Vec<String> {
    medications
        .iter()
        .filter_map(|entry| entry.analysis_name())
        .map(str::to_string)
        .collect()
}
