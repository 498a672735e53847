use serde::{Deserialize, Serialize};

/// Raw patient row as the clinic app stores it.
///
/// Every field is optional and loosely typed — records entered over years
/// by different hands are inconsistent. Nothing outside
/// `context::build_patient_context` should interpret these values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPatientRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub age: Option<i64>,
    /// `"M"` / `"F"` in practice, but free text in the store.
    pub sex: Option<String>,
    /// Tri-state habit answers: `"Yes"`, `"No"`, or anything else.
    pub smoker: Option<String>,
    pub alcoholic: Option<String>,
    pub preferred_language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_row() {
        let record: RawPatientRecord =
            serde_json::from_str(r#"{"id": 7, "sex": "F"}"#).unwrap();
        assert_eq!(record.id, Some(7));
        assert_eq!(record.sex.as_deref(), Some("F"));
        assert!(record.smoker.is_none());
        assert!(record.age.is_none());
    }
}
