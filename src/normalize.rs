//! Normalization of analysis payloads.
//!
//! The analyze endpoint answers with either a JSON document or an opaque string
//! that may itself hold JSON. Both shapes end up here and come out as an
//! `AnalysisResult`, or `None` when the payload carries nothing usable.

use crate::model::AnalysisResult;
use serde_json::Value;

/// Turn a raw payload into an `AnalysisResult`.
///
/// Every JSON object, given directly or encoded in a string, yields `Some`;
/// fields of the wrong type fall back to defaults and keep their raw value in
/// `extra`. `null`, unparsable strings and non-object JSON yield `None`.
/// Never panics.
pub fn normalize_analysis(payload: &Value) -> Option<AnalysisResult> {
    match payload {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(AnalysisResult::from(map)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("analysis payload is not JSON: {e}");
                None
            }
        },
        Value::Object(map) => Some(AnalysisResult::from(map.clone())),
        _ => None,
    }
}

/// Like [`normalize_analysis`] for a payload that may be absent altogether.
pub fn normalize_analysis_opt(payload: Option<&Value>) -> Option<AnalysisResult> {
    payload.and_then(normalize_analysis)
}
