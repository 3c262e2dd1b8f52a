mod gateway;
#[cfg(test)]
pub(crate) mod test_support;
mod validate;

use crate::error::SubmissionError;
use crate::model::{Phase, SubmissionEvent, SubmissionRequest};
use serde_json::Value;
use tokio::sync::mpsc;

/// Drives one submission: credential, binary upload, analysis trigger.
///
/// Each step runs exactly once per `submit` call. The coordinator holds no
/// per-submission state, so concurrent calls simply run side by side. It never
/// touches the result cache; callers decide whether to persist the outcome.
pub struct UploadCoordinator {
    http: reqwest::Client,
    api_base: Option<String>,
    event_tx: Option<mpsc::UnboundedSender<SubmissionEvent>>,
}

impl UploadCoordinator {
    pub fn new(api_base: Option<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(format!("resume-analyzer-cli/{}", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            api_base,
            event_tx: None,
        }
    }

    /// Report phase transitions to `tx`. Dropped receivers are ignored.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<SubmissionEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn emit(&self, ev: SubmissionEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(ev);
        }
    }

    fn phase(&self, phase: Phase) {
        tracing::info!(?phase, "submission phase started");
        self.emit(SubmissionEvent::PhaseStarted { phase });
    }

    /// Run the three-step submission and return the analysis payload as the
    /// service delivered it: decoded JSON, or a string for non-JSON responses.
    pub async fn submit(&self, request: SubmissionRequest) -> Result<Value, SubmissionError> {
        let (resume, base) = validate::validate(&request, self.api_base.as_deref())?;
        let client = gateway::GatewayClient::new(self.http.clone(), base);

        self.phase(Phase::Credential);
        let credential = client.fetch_credential().await?;
        tracing::debug!(file_key = %credential.file_key, "upload credential acquired");

        self.phase(Phase::Upload);
        client
            .put_resume(&credential, resume.bytes.clone())
            .await?;
        self.emit(SubmissionEvent::Info(format!(
            "Uploaded {} ({} bytes)",
            resume.file_name,
            resume.size()
        )));

        self.phase(Phase::Analyze);
        let payload = client
            .trigger_analysis(&credential.file_key, request.domain, &request.job_description)
            .await?;
        Ok(payload)
    }
}
