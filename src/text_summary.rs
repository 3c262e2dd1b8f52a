//! Text dashboard builder for CLI output.
//!
//! Turns a resolved analysis into human-readable lines: the ATS score with its
//! tone, the score breakdown bars, semantic match, skills coverage and
//! suggestions.

use crate::model::{AnalysisResult, CachedEntry};

const BAR_WIDTH: usize = 24;
const FOUND_MAX: f64 = 60.0;
const PENALTY_MAX: f64 = 20.0;
const SEMANTIC_MAX: f64 = 40.0;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScoreTone {
    Strong,
    Improving,
    NeedsFocus,
}

impl ScoreTone {
    pub fn for_score(score: f64) -> Self {
        if score >= 70.0 {
            ScoreTone::Strong
        } else if score >= 40.0 {
            ScoreTone::Improving
        } else {
            ScoreTone::NeedsFocus
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreTone::Strong => "Strong",
            ScoreTone::Improving => "Improving",
            ScoreTone::NeedsFocus => "Needs focus",
        }
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}

/// Overall ATS score limited to 0..=100.
pub(crate) fn normalized_score(result: &AnalysisResult) -> f64 {
    clamp_percent(result.score.score)
}

/// Semantic match (0..1) as a rounded whole percentage.
pub(crate) fn semantic_percent(result: &AnalysisResult) -> u8 {
    clamp_percent((result.semantic_match * 100.0).round()) as u8
}

fn bar(value: f64, max: f64) -> String {
    let pct = clamp_percent(value / max * 100.0);
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn push_list(lines: &mut Vec<String>, title: &str, items: &[String], empty: &str) {
    if items.is_empty() {
        lines.push(format!("{title}: {empty}"));
    } else {
        lines.push(format!("{title}: {}", items.join(", ")));
    }
}

/// Build the dashboard for a resolved analysis. `cached` is set when the result
/// came from the local store.
pub(crate) fn build_text_summary(
    result: &AnalysisResult,
    cached: Option<&CachedEntry>,
) -> TextSummary {
    let mut lines = Vec::new();
    let details = &result.score.details;
    let score = normalized_score(result);
    let tone = ScoreTone::for_score(score);

    lines.push(format!(
        "ATS score: {} / 100 ({})",
        fmt_num(score),
        tone.label()
    ));
    for (label, value, max) in [
        ("Found score", details.found_score, FOUND_MAX),
        ("Penalty", details.penalty, PENALTY_MAX),
        ("Semantic score", details.semantic_score, SEMANTIC_MAX),
    ] {
        lines.push(format!(
            "  {:<15} {:>5} / {:<3} {}",
            label,
            fmt_num(value),
            fmt_num(max),
            bar(value, max)
        ));
    }
    lines.push("  Formula: ATS = Found + Semantic - Penalty".to_string());

    let semantic = semantic_percent(result);
    lines.push(format!(
        "Semantic match: {semantic}% {} (target 70%+)",
        bar(semantic as f64, 100.0)
    ));

    push_list(
        &mut lines,
        "Skills detected",
        &result.skills,
        "No skills detected yet.",
    );
    push_list(
        &mut lines,
        "Missing skills",
        &result.missing_skills,
        "No missing skills.",
    );

    let suggestions: Vec<&str> = result
        .suggestions
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if suggestions.is_empty() {
        lines.push("Suggestions: No suggestions yet.".to_string());
    } else {
        lines.push("Suggestions:".to_string());
        lines.extend(suggestions.iter().map(|s| format!("  - {s}")));
    }

    if let Some(entry) = cached {
        lines.push(format!("Saved: {}", format_saved_at(entry.saved_at)));
    }

    TextSummary { lines }
}

/// Lines for the explicit empty state.
pub(crate) fn build_empty_summary() -> TextSummary {
    TextSummary {
        lines: vec![
            "No data found".to_string(),
            "Upload a resume and job description to generate your analysis dashboard.".to_string(),
        ],
    }
}

fn format_saved_at(millis: i64) -> String {
    time::OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
        .ok()
        .and_then(|t| {
            t.format(&time::format_description::well_known::Rfc3339)
                .ok()
        })
        .unwrap_or_else(|| millis.to_string())
}
