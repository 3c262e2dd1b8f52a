use thiserror::Error;

/// Maximum number of characters of a failing response body kept for diagnostics.
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Every way a submission can fail. Returned to the caller as a single value;
/// nothing is retried.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("resume upload failed ({status}): {body}")]
    Upload { status: u16, body: String },

    #[error("analyze failed ({status}): {body}")]
    Analysis { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SubmissionError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        SubmissionError::Validation(msg.into())
    }

    pub(crate) fn upload(status: u16, body: &str) -> Self {
        SubmissionError::Upload {
            status,
            body: excerpt(body),
        }
    }

    pub(crate) fn analysis(status: u16, body: &str) -> Self {
        SubmissionError::Analysis {
            status,
            body: excerpt(body),
        }
    }
}

/// First `BODY_EXCERPT_CHARS` characters of a response body.
pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
