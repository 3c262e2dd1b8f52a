//! In-process stand-in for the remote API used by coordinator tests.
//!
//! Serves `GET /getS3Url`, `PUT /upload` (the "presigned" URL it hands
//! out) and `POST /analyze` on an ephemeral localhost port, counting each hit.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

pub(crate) const FILE_KEY: &str = "uploads/test-resume.pdf";

#[derive(Debug, Clone, Copy)]
pub(crate) enum CredentialReply {
    Valid,
    MissingUploadUrl,
    MissingFileKey,
    EmptyFileKey,
    Garbage,
}

#[derive(Debug, Clone)]
pub(crate) struct AnalyzeReply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl AnalyzeReply {
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json; charset=utf-8",
            body: body.to_string(),
        }
    }

    pub fn text(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/plain",
            body,
        }
    }

    pub fn status(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedUpload {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct Hits {
    credential: AtomicUsize,
    upload: AtomicUsize,
    analyze: AtomicUsize,
    last_upload: Mutex<Option<RecordedUpload>>,
    last_analyze_body: Mutex<Option<Value>>,
}

impl Hits {
    pub fn credential(&self) -> usize {
        self.credential.load(Ordering::SeqCst)
    }

    pub fn upload(&self) -> usize {
        self.upload.load(Ordering::SeqCst)
    }

    pub fn analyze(&self) -> usize {
        self.analyze.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.credential() + self.upload() + self.analyze()
    }

    pub fn last_upload(&self) -> Option<RecordedUpload> {
        self.last_upload.lock().unwrap().clone()
    }

    pub fn last_analyze_body(&self) -> Option<Value> {
        self.last_analyze_body.lock().unwrap().clone()
    }
}

struct FakeState {
    base: String,
    credential: CredentialReply,
    upload_status: u16,
    upload_body: String,
    analyze: AnalyzeReply,
    hits: Arc<Hits>,
}

pub(crate) struct FakeApi {
    pub base: String,
    pub file_key: &'static str,
    pub hits: Arc<Hits>,
}

pub(crate) struct FakeApiBuilder {
    credential: CredentialReply,
    upload_status: u16,
    upload_body: String,
    analyze: AnalyzeReply,
}

impl FakeApi {
    pub fn builder() -> FakeApiBuilder {
        FakeApiBuilder {
            credential: CredentialReply::Valid,
            upload_status: 200,
            upload_body: String::new(),
            analyze: AnalyzeReply::json(json!({
                "score": { "score": 64, "details": { "found_score": 40, "penalty": 4, "semantic_score": 28 } },
                "semanticMatch": 0.7,
                "skills": ["python"],
                "missingSkills": [],
                "suggestions": []
            })),
        }
    }

    pub async fn start() -> FakeApi {
        Self::builder().start().await
    }
}

impl FakeApiBuilder {
    pub fn credential(mut self, reply: CredentialReply) -> Self {
        self.credential = reply;
        self
    }

    pub fn upload_status(mut self, status: u16, body: String) -> Self {
        self.upload_status = status;
        self.upload_body = body;
        self
    }

    pub fn analyze(mut self, reply: AnalyzeReply) -> Self {
        self.analyze = reply;
        self
    }

    pub async fn start(self) -> FakeApi {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake api");
        let addr = listener.local_addr().expect("fake api addr");
        let base = format!("http://{addr}");
        let hits = Arc::new(Hits::default());

        let state = Arc::new(FakeState {
            base: base.clone(),
            credential: self.credential,
            upload_status: self.upload_status,
            upload_body: self.upload_body,
            analyze: self.analyze,
            hits: hits.clone(),
        });

        let app = Router::new()
            .route("/getS3Url", get(get_credential))
            .route("/upload", put(put_upload))
            .route("/analyze", post(post_analyze))
            .with_state(state);

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        FakeApi {
            base,
            file_key: FILE_KEY,
            hits,
        }
    }
}

async fn get_credential(State(state): State<Arc<FakeState>>) -> Response {
    state.hits.credential.fetch_add(1, Ordering::SeqCst);
    let upload_url = format!("{}/upload", state.base);
    match state.credential {
        CredentialReply::Valid => {
            Json(json!({ "uploadUrl": upload_url, "fileKey": FILE_KEY })).into_response()
        }
        CredentialReply::MissingUploadUrl => Json(json!({ "fileKey": FILE_KEY })).into_response(),
        CredentialReply::MissingFileKey => {
            Json(json!({ "uploadUrl": upload_url })).into_response()
        }
        CredentialReply::EmptyFileKey => {
            Json(json!({ "uploadUrl": upload_url, "fileKey": "" })).into_response()
        }
        CredentialReply::Garbage => "<html>gateway timeout</html>".into_response(),
    }
}

async fn put_upload(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.hits.upload.fetch_add(1, Ordering::SeqCst);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.hits.last_upload.lock().unwrap() = Some(RecordedUpload {
        content_type,
        body: body.to_vec(),
    });
    let status = StatusCode::from_u16(state.upload_status).unwrap_or(StatusCode::OK);
    (status, state.upload_body.clone()).into_response()
}

async fn post_analyze(State(state): State<Arc<FakeState>>, body: Bytes) -> Response {
    state.hits.analyze.fetch_add(1, Ordering::SeqCst);
    *state.hits.last_analyze_body.lock().unwrap() = serde_json::from_slice(&body).ok();
    let reply = &state.analyze;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    (
        status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body.clone(),
    )
        .into_response()
}
