//! Analysis view initializer.
//!
//! A freshly submitted result is handed in explicitly; without one the view
//! falls back to the last result in the local store.

use crate::model::{AnalysisResult, CachedEntry};
use crate::normalize::normalize_analysis_opt;
use crate::storage::ResultCache;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResolvedAnalysis {
    /// Result handed in by the submission that just finished. `saved_to` is
    /// set only when the write-through actually reached the store.
    Transient {
        result: AnalysisResult,
        saved_to: Option<PathBuf>,
    },
    /// Result read back from the local store.
    Cached(CachedEntry),
    /// Nothing to show.
    Empty,
}

impl ResolvedAnalysis {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            ResolvedAnalysis::Transient { result, .. } => Some(result),
            ResolvedAnalysis::Cached(entry) => Some(&entry.data),
            ResolvedAnalysis::Empty => None,
        }
    }
}

/// Prefer the transient payload, writing it through to `cache` when
/// `write_through` is set; otherwise read the cached entry.
pub(crate) async fn resolve_analysis(
    transient: Option<&Value>,
    cache: &ResultCache,
    write_through: bool,
) -> ResolvedAnalysis {
    if let Some(result) = normalize_analysis_opt(transient) {
        let saved_to = if write_through {
            cache.save(&result).await
        } else {
            None
        };
        return ResolvedAnalysis::Transient { result, saved_to };
    }

    if transient.is_some() {
        tracing::warn!("analysis payload was not usable; falling back to the saved result");
    }

    match cache.load_entry().await {
        Some(entry) => ResolvedAnalysis::Cached(entry),
        None => ResolvedAnalysis::Empty,
    }
}
