//! Patient Context Builder — the single normalization boundary between
//! raw record rows and the analysis engine's input shape.
//!
//! Pure and total: missing or malformed fields are omitted, never an
//! error. No other module interprets raw patient or lab values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{RawLabRecord, RawPatientRecord};

/// Confirmed lifestyle habits. Only keys that are actually known are
/// serialized — the engine applies its own defaults for absent ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub smokes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub drinks_alcohol: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_pregnant: Option<bool>,
}

/// Parsed lab values and vitals. Invariant: every numeric field is
/// either a successfully parsed number or absent — a non-numeric stored
/// value never becomes zero or NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientLabs {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub egfr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sodium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub potassium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bilirubin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tsh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub free_t3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub free_t4: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pulse: Option<i64>,
    #[serde(default)]
    pub other_investigations: BTreeMap<String, String>,
}

/// Normalized patient context sent with every analysis request.
/// Built fresh on each trigger, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    pub profile: PatientProfile,
    pub labs: PatientLabs,
}

/// Build the normalized context from a raw patient row and an optional
/// raw lab snapshot.
pub fn build_patient_context(
    patient: &RawPatientRecord,
    labs: Option<&RawLabRecord>,
) -> PatientContext {
    PatientContext {
        profile: build_profile(patient),
        labs: labs.map(build_labs).unwrap_or_default(),
    }
}

fn build_profile(patient: &RawPatientRecord) -> PatientProfile {
    PatientProfile {
        smokes: tri_state(patient.smoker.as_deref()),
        drinks_alcohol: tri_state(patient.alcoholic.as_deref()),
        // Male records can never be pregnant; female records are left
        // unset so the engine applies its own default. Asymmetric on
        // purpose, do not turn this into a symmetric rule.
        is_pregnant: match patient.sex.as_deref() {
            Some("M") => Some(false),
            _ => None,
        },
    }
}

fn build_labs(record: &RawLabRecord) -> PatientLabs {
    PatientLabs {
        weight_kg: parse_f64(record.weight.as_ref()),
        height_cm: parse_f64(record.height.as_ref()),
        bmi: parse_f64(record.bmi.as_ref()),
        egfr: parse_f64(record.egfr.as_ref()),
        sodium: parse_f64(record.sodium.as_ref()),
        potassium: parse_f64(record.potassium.as_ref()),
        bilirubin: parse_f64(record.bilirubin.as_ref()),
        tsh: parse_f64(record.tsh.as_ref()),
        free_t3: parse_f64(record.free_t3.as_ref()),
        free_t4: parse_f64(record.free_t4.as_ref()),
        pulse: parse_i64(record.pulse.as_ref()),
        other_investigations: collect_other_investigations(&record.extra),
    }
}

/// `"Yes"` → true, `"No"` → false, anything else → unknown.
fn tri_state(value: Option<&str>) -> Option<bool> {
    match value {
        Some("Yes") => Some(true),
        Some("No") => Some(false),
        _ => None,
    }
}

fn parse_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn parse_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Carry unknown lab columns through verbatim, keyed by their original
/// field name. Scalars only; null, empty and composite values are
/// dropped.
fn collect_other_investigations(extra: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, value) in extra {
        let text = match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    continue;
                }
                s.clone()
            }
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        out.insert(key.clone(), text);
    }
    out
}
