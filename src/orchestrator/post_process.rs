//! Post-submission processing.
//!
//! Resolves the payload for display, writes it through to the local store and
//! runs the optional export.

use super::analysis_view::{resolve_analysis, ResolvedAnalysis};
use crate::model::AnalysisResult;
use crate::storage::{self, ResultCache};
use serde_json::Value;
use std::path::Path;

/// Outcome of post-submission processing, ready for presentation layers.
pub(crate) struct ProcessedSubmission {
    pub resolved: ResolvedAnalysis,
    pub messages: Vec<String>,
}

/// Process a finished submission. Export failures become messages rather than
/// errors; the analysis itself already succeeded.
pub(crate) async fn process_submission(
    payload: Option<&Value>,
    cache: &ResultCache,
    auto_save: bool,
    export_json: Option<&Path>,
) -> ProcessedSubmission {
    let resolved = resolve_analysis(payload, cache, auto_save).await;
    let mut messages = Vec::new();

    match &resolved {
        ResolvedAnalysis::Transient { saved_to: Some(p), .. } => {
            messages.push(format!("Saved: {}", p.display()));
        }
        ResolvedAnalysis::Cached(_) if payload.is_some() => {
            messages.push(
                "Analysis response was not structured; showing the last saved analysis".into(),
            );
        }
        _ => {}
    }

    if let (Some(path), Some(result)) = (export_json, resolved.result()) {
        messages.push(export_message(path, result));
    }

    ProcessedSubmission { resolved, messages }
}

/// Export `result` and describe the outcome for the user.
pub(crate) fn export_message(path: &Path, result: &AnalysisResult) -> String {
    match storage::export_json(path, result) {
        Ok(()) => format!("Exported JSON: {}", path.display()),
        Err(e) => format!("Export JSON failed: {e:#}"),
    }
}
