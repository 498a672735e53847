//! rxgate — clinical safety analysis orchestration for the prescribing screen.
//!
//! The crate owns the one subsystem of the record-keeping app with real
//! coordination logic: normalizing raw patient and lab records into the
//! shape the external analysis engine expects, running exactly one
//! analysis per explicit clinician action, and driving the debounced
//! incremental drug search against the formulary. Everything else
//! (record CRUD, auth, uploads, rendering) stays behind trait seams.

pub mod config;
pub mod context;
pub mod engine;
pub mod medications;
pub mod models;
pub mod orchestrator;
pub mod records;
pub mod search;

use tracing_subscriber::EnvFilter;

pub use context::{build_patient_context, PatientContext, PatientLabs, PatientProfile};
pub use engine::client::EngineClient;
pub use engine::types::{AnalysisRequest, AnalysisResult};
pub use medications::MedicationListController;
pub use orchestrator::{AnalysisOrchestrator, AnalysisState};
pub use records::RecordsClient;
pub use search::DrugSearchSession;

/// Initialize tracing for binaries and integration harnesses.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the crate default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
