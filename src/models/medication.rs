use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One prescribed item on the medication list.
///
/// `held` is a client-local pause flag — it is never persisted and does
/// not remove the entry from analysis input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub id: Uuid,
    pub brand_name: String,
    pub generic_name: String,
    pub strength: String,
    pub route: String,
    pub frequency: String,
    pub days: String,
    #[serde(default)]
    pub held: bool,
}

impl MedicationEntry {
    /// The name sent to the analysis engine: generic when present,
    /// otherwise the brand name.
    pub fn analysis_name(&self) -> Option<&str> {
        let generic = self.generic_name.trim();
        if !generic.is_empty() {
            return Some(generic);
        }
        let brand = self.brand_name.trim();
        if !brand.is_empty() {
            return Some(brand);
        }
        None
    }
}

/// A formulary hit from `/api/drug-inventory/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrugCandidate {
    pub brand_name: String,
    pub generic_name: String,
    pub strength: String,
    pub stock: Option<i64>,
}

impl DrugCandidate {
    /// Canonical display label filled into the search box on selection,
    /// e.g. `"Glucophage — Metformin (500mg)"`.
    pub fn label(&self) -> String {
        let mut label = self.brand_name.trim().to_string();
        let generic = self.generic_name.trim();
        if !generic.is_empty() {
            if label.is_empty() {
                label = generic.to_string();
            } else {
                label = format!("{label} — {generic}");
            }
        }
        let strength = self.strength.trim();
        if !strength.is_empty() {
            label = format!("{label} ({strength})");
        }
        label
    }
}
