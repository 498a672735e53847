//! Wire types for the analysis engine (JSON over HTTP, snake_case).
//!
//! Request structs skip absent optionals; response structs default every
//! field so a partial payload degrades to empty lists instead of a
//! deserialization failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::{PatientLabs, PatientProfile};

// ═══════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════

/// Body for `POST /agent/analyze`. Immutable once sent — assembled fresh
/// on every trigger by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub medications: Vec<String>,
    #[serde(default)]
    pub diseases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub dose_map: BTreeMap<String, String>,
    pub patient_profile: PatientProfile,
    pub patient_labs: PatientLabs,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preferred_language: Option<String>,
}

/// Body for `POST /dosing` — the dosing-only subset of an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DosingRequest {
    pub medications: Vec<String>,
    #[serde(default)]
    pub diseases: Vec<String>,
    pub age: i64,
    pub sex: String,
    #[serde(default)]
    pub dose_map: BTreeMap<String, String>,
    pub patient_labs: PatientLabs,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PairCheckRequest<'a> {
    pub drug1: &'a str,
    pub drug2: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DrugValidateRequest<'a> {
    pub drug_name: &'a str,
}

// ═══════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════

/// Envelope around `POST /agent/analyze` success bodies.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnalyzeEnvelope {
    pub analysis: AnalysisResult,
}

/// Error body the engine sends on non-2xx.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EngineErrorBody {
    pub detail: String,
}

/// Full result of one analysis run, rendered by category. One instance
/// lives in orchestrator state per successful run and is superseded
/// wholesale by the next — never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub drug_drug: Vec<DrugDrugInteraction>,
    pub drug_disease: Vec<DrugDiseaseInteraction>,
    pub drug_food: Vec<FoodInteraction>,
    pub dosing_recommendations: Vec<DosingRecommendation>,
    pub drug_counseling: Vec<DrugCounseling>,
    pub condition_counseling: Vec<ConditionCounseling>,
    pub risk_summary: Option<RiskSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrugDrugInteraction {
    pub drug1: String,
    pub drug2: String,
    pub severity: String,
    pub confidence: f64,
    pub mechanism: String,
    pub clinical_effects: String,
    pub recommendation: String,
    pub evidence_level: String,
    pub pubmed_papers: i64,
    pub fda_reports: i64,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrugDiseaseInteraction {
    pub drug: String,
    pub disease: String,
    pub contraindicated: bool,
    pub severity: String,
    pub confidence: f64,
    pub clinical_evidence: String,
    pub recommendation: String,
    pub alternatives: Vec<String>,
    pub pubmed_papers: i64,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodInteraction {
    pub drug: String,
    pub foods_to_avoid: Vec<String>,
    pub foods_to_separate: Vec<String>,
    pub foods_to_monitor: Vec<String>,
    pub mechanism: String,
    pub evidence_summary: String,
    pub pubmed_papers: i64,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DosingRecommendation {
    pub drug: String,
    pub current_dose: String,
    pub recommended_dose: String,
    pub adjustment_required: bool,
    pub adjustment_type: String,
    pub urgency: String,
    pub adjustment_reason: String,
    pub hold_threshold: String,
    pub monitoring_required: String,
    pub fda_label_basis: String,
    pub evidence_tier: String,
    pub evidence_confidence: String,
    pub patient_flags_used: Vec<String>,
    pub clinical_note: String,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounselingPoint {
    pub title: String,
    pub detail: String,
    pub severity: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrugCounseling {
    pub drug: String,
    pub patient_context: String,
    pub counseling_points: Vec<CounselingPoint>,
    pub key_monitoring: String,
    pub patient_summary: String,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseAdvice {
    pub title: String,
    pub detail: String,
    pub frequency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleAdvice {
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietAdvice {
    pub title: String,
    pub detail: String,
    pub nutrients_to_increase: Vec<String>,
    pub nutrients_to_reduce: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyAdvice {
    pub title: String,
    pub detail: String,
    pub urgency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionCounseling {
    pub condition: String,
    pub patient_context: String,
    pub exercise: Vec<ExerciseAdvice>,
    pub lifestyle: Vec<LifestyleAdvice>,
    pub diet: Vec<DietAdvice>,
    pub safety: Vec<SafetyAdvice>,
    pub monitoring: String,
    pub follow_up: String,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSummary {
    pub level: String,
    pub severe_ddi_count: i64,
    pub moderate_ddi_count: i64,
    pub contraindicated: i64,
    pub total_papers: i64,
}

/// Response from `POST /check/drug-pair` — the ungated quick check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairCheck {
    pub pair: String,
    pub severity: String,
    pub confidence: f64,
    pub mechanism: String,
    pub clinical_effects: String,
    pub recommendation: String,
    pub from_cache: bool,
    pub badge_color: String,
}

/// Response from `POST /validate/drug`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrugValidation {
    pub drug: String,
    pub recognised: bool,
    pub has_warnings: bool,
    pub has_contraindications: bool,
}

/// Response from `POST /dosing`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DosingResponse {
    pub dosing_recommendations: Vec<DosingRecommendation>,
    pub summary: DosingSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DosingSummary {
    pub total_drugs: i64,
    pub adjustments_required: i64,
    pub high_urgency_count: i64,
    pub always_fresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analysis_result_tolerates_partial_payload() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "drug_drug": [{
                "drug1": "Warfarin",
                "drug2": "Aspirin",
                "severity": "severe",
                "confidence": 0.92,
                "from_cache": true
            }]
        }))
        .unwrap();
        assert_eq!(result.drug_drug.len(), 1);
        assert!(result.drug_drug[0].from_cache);
        assert_eq!(result.drug_drug[0].severity, "severe");
        assert!(result.drug_disease.is_empty());
        assert!(result.risk_summary.is_none());
    }

    #[test]
    fn risk_summary_round_trips() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "risk_summary": {
                "level": "HIGH",
                "severe_ddi_count": 1,
                "moderate_ddi_count": 2,
                "contraindicated": 1,
                "total_papers": 17
            }
        }))
        .unwrap();
        let summary = result.risk_summary.unwrap();
        assert_eq!(summary.level, "HIGH");
        assert_eq!(summary.total_papers, 17);
    }

    #[test]
    fn request_skips_absent_optionals() {
        let request = AnalysisRequest {
            medications: vec!["Metformin".into()],
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("age"));
        assert!(!object.contains_key("sex"));
        assert!(!object.contains_key("preferred_language"));
        assert!(object.contains_key("patient_profile"));
        assert!(object.contains_key("patient_labs"));
    }

    #[test]
    fn pair_check_parses_engine_shape() {
        let check: PairCheck = serde_json::from_value(json!({
            "pair": "Warfarin + Aspirin",
            "severity": "severe",
            "confidence": 0.9,
            "mechanism": "additive anticoagulation",
            "clinical_effects": "bleeding risk",
            "recommendation": "avoid",
            "from_cache": false,
            "badge_color": "#FF4444"
        }))
        .unwrap();
        assert_eq!(check.pair, "Warfarin + Aspirin");
        assert_eq!(check.badge_color, "#FF4444");
    }
}
