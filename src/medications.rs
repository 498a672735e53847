//! Medication List Controller — the ordered list of prescribed items
//! that feeds the analysis orchestrator.
//!
//! Validation happens locally before any network round trip, edit and
//! delete pass through a persistence seam, and the controller never
//! invokes the orchestrator itself. It only supplies the current list
//! when the clinician explicitly triggers an analysis.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{DrugCandidate, MedicationEntry};
use crate::records::RecordsError;

/// Persistence seam for edit/delete pass-through. Record storage itself
/// is out of scope; tests substitute a recording mock.
pub trait MedicationStore: Send + Sync {
    fn save(
        &self,
        entry: &MedicationEntry,
    ) -> impl Future<Output = Result<(), RecordsError>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), RecordsError>> + Send;
}

/// Form state for a new entry: a candidate picked from the search
/// session plus the manually entered fields.
#[derive(Debug, Clone, Default)]
pub struct MedicationDraft {
    pub candidate: Option<DrugCandidate>,
    pub route: String,
    pub frequency: String,
    pub days: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum MedicationError {
    #[error("Select a drug from the search results first")]
    NoDrugSelected,

    #[error("Route is required")]
    MissingRoute,

    #[error("Frequency is required")]
    MissingFrequency,

    #[error("Days is required")]
    MissingDays,

    #[error("No medication with id {0}")]
    NotFound(Uuid),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<RecordsError> for MedicationError {
    fn from(error: RecordsError) -> Self {
        MedicationError::Store(error.to_string())
    }
}

/// Field-level changes for an edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct MedicationUpdate {
    pub strength: Option<String>,
    pub route: Option<String>,
    pub frequency: Option<String>,
    pub days: Option<String>,
}

pub struct MedicationListController<S> {
    store: S,
    entries: Vec<MedicationEntry>,
}

impl<S: MedicationStore> MedicationListController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
        }
    }

    pub fn with_entries(store: S, entries: Vec<MedicationEntry>) -> Self {
        Self { store, entries }
    }

    pub fn entries(&self) -> &[MedicationEntry] {
        &self.entries
    }

    /// Validate and append a new entry. Purely local: validation
    /// failures block the action before any network call, and the save
    /// happens with the prescription, not here.
    pub fn add(&mut self, draft: MedicationDraft) -> Result<&MedicationEntry, MedicationError> {
        let candidate = draft.candidate.ok_or(MedicationError::NoDrugSelected)?;
        if draft.route.trim().is_empty() {
            return Err(MedicationError::MissingRoute);
        }
        if draft.frequency.trim().is_empty() {
            return Err(MedicationError::MissingFrequency);
        }
        if draft.days.trim().is_empty() {
            return Err(MedicationError::MissingDays);
        }

        let entry = MedicationEntry {
            id: Uuid::new_v4(),
            brand_name: candidate.brand_name,
            generic_name: candidate.generic_name,
            strength: candidate.strength,
            route: draft.route,
            frequency: draft.frequency,
            days: draft.days,
            held: false,
        };
        tracing::debug!(drug = %entry.generic_name, "medication added");
        self.entries.push(entry);
        Ok(self.entries.last().expect("entry just pushed"))
    }

    /// Apply field edits and pass the updated entry through to the
    /// store.
    pub async fn update(
        &mut self,
        id: Uuid,
        changes: MedicationUpdate,
    ) -> Result<(), MedicationError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(MedicationError::NotFound(id))?;

        if let Some(strength) = changes.strength {
            entry.strength = strength;
        }
        if let Some(route) = changes.route {
            entry.route = route;
        }
        if let Some(frequency) = changes.frequency {
            entry.frequency = frequency;
        }
        if let Some(days) = changes.days {
            entry.days = days;
        }

        self.store.save(entry).await?;
        Ok(())
    }

    /// Flip the client-local hold flag. No persistence — holding is a
    /// pause marker independent of the stored prescription.
    pub fn toggle_hold(&mut self, id: Uuid) -> Result<bool, MedicationError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(MedicationError::NotFound(id))?;
        entry.held = !entry.held;
        Ok(entry.held)
    }

    /// Delete from the store, then from the local list.
    pub async fn remove(&mut self, id: Uuid) -> Result<(), MedicationError> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(MedicationError::NotFound(id))?;

        self.store.delete(id).await?;
        self.entries.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingStore {
        saves: Arc<AtomicUsize>,
        deletes: Arc<Mutex<Vec<Uuid>>>,
    }

    impl MedicationStore for RecordingStore {
        async fn save(&self, _: &MedicationEntry) -> Result<(), RecordsError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> Result<(), RecordsError> {
            self.deletes.lock().unwrap().push(id);
            Ok(())
        }
    }

    fn draft() -> MedicationDraft {
        MedicationDraft {
            candidate: Some(DrugCandidate {
                brand_name: "Glucophage".into(),
                generic_name: "Metformin".into(),
                strength: "500mg".into(),
                stock: Some(12),
            }),
            route: "PO".into(),
            frequency: "BID".into(),
            days: "30".into(),
        }
    }

    #[test]
    fn add_requires_candidate_and_all_fields() {
        let store = RecordingStore::default();
        let mut controller = MedicationListController::new(store.clone());

        let mut missing_drug = draft();
        missing_drug.candidate = None;
        assert_eq!(
            controller.add(missing_drug).unwrap_err(),
            MedicationError::NoDrugSelected
        );

        let mut missing_route = draft();
        missing_route.route = "  ".into();
        assert_eq!(
            controller.add(missing_route).unwrap_err(),
            MedicationError::MissingRoute
        );

        let mut missing_frequency = draft();
        missing_frequency.frequency = String::new();
        assert_eq!(
            controller.add(missing_frequency).unwrap_err(),
            MedicationError::MissingFrequency
        );

        let mut missing_days = draft();
        missing_days.days = String::new();
        assert_eq!(
            controller.add(missing_days).unwrap_err(),
            MedicationError::MissingDays
        );

        // Validation failures never reach the store.
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
        assert!(controller.entries().is_empty());
    }

    #[test]
    fn add_copies_candidate_fields_into_the_entry() {
        let mut controller = MedicationListController::new(RecordingStore::default());
        let entry = controller.add(draft()).unwrap();
        assert_eq!(entry.generic_name, "Metformin");
        assert_eq!(entry.brand_name, "Glucophage");
        assert_eq!(entry.strength, "500mg");
        assert!(!entry.held);
    }

    #[tokio::test]
    async fn update_applies_changes_and_saves() {
        let store = RecordingStore::default();
        let mut controller = MedicationListController::new(store.clone());
        let id = controller.add(draft()).unwrap().id;

        controller
            .update(
                id,
                MedicationUpdate {
                    frequency: Some("TID".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(controller.entries()[0].frequency, "TID");
        assert_eq!(controller.entries()[0].route, "PO");
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn toggle_hold_is_local_only() {
        let store = RecordingStore::default();
        let mut controller = MedicationListController::new(store.clone());
        let id = controller.add(draft()).unwrap().id;

        assert!(controller.toggle_hold(id).unwrap());
        assert!(!controller.toggle_hold(id).unwrap());
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remove_deletes_from_store_and_list() {
        let store = RecordingStore::default();
        let mut controller = MedicationListController::new(store.clone());
        let id = controller.add(draft()).unwrap().id;

        controller.remove(id).await.unwrap();
        assert!(controller.entries().is_empty());
        assert_eq!(store.deletes.lock().unwrap().as_slice(), &[id]);
    }

    #[tokio::test]
    async fn unknown_id_is_reported() {
        let mut controller = MedicationListController::new(RecordingStore::default());
        let id = Uuid::new_v4();
        assert_eq!(
            controller.remove(id).await.unwrap_err(),
            MedicationError::NotFound(id)
        );
    }
}
