//! Application-level orchestration utilities.
//!
//! This module owns what happens around a submission: resolving what the
//! analysis view shows (fresh result or the saved one) and post-submission
//! processing such as write-through and exports. The CLI layer calls into this
//! module to keep responsibilities separated.

mod analysis_view;
mod post_process;

pub(crate) use analysis_view::{resolve_analysis, ResolvedAnalysis};
pub(crate) use post_process::{export_message, process_submission};
