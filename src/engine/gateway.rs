use crate::error::SubmissionError;
use crate::model::{Domain, UploadCredential};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialResponse {
    #[serde(default)]
    upload_url: Option<String>,
    #[serde(default)]
    file_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    file_key: &'a str,
    domain: &'a str,
    jd: &'a str,
}

/// Thin HTTP client for the remote API and the presigned storage URL.
#[derive(Clone)]
pub(crate) struct GatewayClient {
    http: reqwest::Client,
    base: String,
}

impl GatewayClient {
    pub fn new(http: reqwest::Client, base: &str) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn credential_url(&self) -> String {
        format!("{}/getS3Url", self.base)
    }

    fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base)
    }

    /// `GET {base}/getS3Url`. Both fields must be present and non-empty.
    pub async fn fetch_credential(&self) -> Result<UploadCredential, SubmissionError> {
        let resp = self.http.get(self.credential_url()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, "credential response received");

        let parsed: CredentialResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::debug!("credential body did not decode: {e}");
            SubmissionError::Protocol("malformed upload credential response".into())
        })?;

        match (non_empty(parsed.upload_url), non_empty(parsed.file_key)) {
            (Some(upload_url), Some(file_key)) => Ok(UploadCredential {
                upload_url,
                file_key,
            }),
            _ => Err(SubmissionError::Protocol(
                "missing upload credential fields".into(),
            )),
        }
    }

    /// `PUT {uploadUrl}` with the raw PDF bytes.
    pub async fn put_resume(
        &self,
        credential: &UploadCredential,
        bytes: Bytes,
    ) -> Result<(), SubmissionError> {
        let resp = self
            .http
            .put(&credential.upload_url)
            .header(CONTENT_TYPE, "application/pdf")
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(SubmissionError::upload(status.as_u16(), &text));
        }
        Ok(())
    }

    /// `POST {base}/analyze`. JSON responses are decoded, anything else is kept
    /// as an opaque string.
    pub async fn trigger_analysis(
        &self,
        file_key: &str,
        domain: Domain,
        job_description: &str,
    ) -> Result<Value, SubmissionError> {
        let payload = AnalyzeRequest {
            file_key,
            domain: domain.as_wire_str(),
            jd: job_description,
        };
        let resp = self
            .http
            .post(self.analyze_url())
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(SubmissionError::analysis(status.as_u16(), &text));
        }

        if is_json {
            serde_json::from_str(&text).map_err(|e| {
                tracing::debug!("analysis body did not decode: {e}");
                SubmissionError::Protocol("malformed analysis response".into())
            })
        } else {
            Ok(Value::String(text))
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}
