use crate::error::SubmissionError;
use crate::model::{ResumeFile, SubmissionRequest};

/// Check every precondition of a submission without touching the network.
///
/// Returns the resume and the usable API base on success.
pub(crate) fn validate<'a>(
    request: &'a SubmissionRequest,
    api_base: Option<&'a str>,
) -> Result<(&'a ResumeFile, &'a str), SubmissionError> {
    let resume = match request.resume.as_ref() {
        Some(file) if file.size() > 0 => file,
        _ => return Err(SubmissionError::validation("Please select a PDF resume.")),
    };

    if resume.extension().as_deref() != Some("pdf") {
        return Err(SubmissionError::validation(
            "Upload the resume only in pdf format",
        ));
    }

    if request.job_description.trim().is_empty() {
        return Err(SubmissionError::validation(
            "Please paste a job description.",
        ));
    }

    let base = api_base
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| {
            SubmissionError::validation(format!(
                "Missing {} configuration",
                crate::config::API_BASE_ENV
            ))
        })?;

    Ok((resume, base))
}
