use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw lab snapshot row from `/api/lab/{id}` or `/api/op-lab/{id}`.
///
/// Known investigation fields arrive as whatever the form stored —
/// strings, numbers, or null — so they are kept as `Value` until the
/// context builder parses them. Any column this struct does not name
/// lands in `extra` and is carried through to the engine verbatim as an
/// "other investigation", which keeps new lab columns working without a
/// code change here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLabRecord {
    pub id: Option<i64>,
    pub patient_id: Option<i64>,
    pub recorded_at: Option<String>,
    pub weight: Option<Value>,
    pub height: Option<Value>,
    pub bmi: Option<Value>,
    pub egfr: Option<Value>,
    pub sodium: Option<Value>,
    pub potassium: Option<Value>,
    pub bilirubin: Option<Value>,
    pub tsh: Option<Value>,
    pub free_t3: Option<Value>,
    pub free_t4: Option<Value>,
    pub pulse: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
