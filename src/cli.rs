use crate::config::Config;
use crate::engine::UploadCoordinator;
use crate::model::{Domain, ResumeFile, SubmissionEvent, SubmissionRequest};
use crate::orchestrator::{export_message, process_submission, resolve_analysis, ResolvedAnalysis};
use crate::storage::ResultCache;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "resume-analyzer-cli",
    version,
    about = "Upload a PDF resume for ATS analysis against a job description"
)]
pub struct Cli {
    /// Target domain the resume is scored against
    #[arg(long, value_enum, default_value_t = Domain::MachineLearning)]
    pub domain: Domain,

    /// Job description text
    #[arg(long, conflicts_with = "jd_file")]
    pub jd: Option<String>,

    /// Read the job description from a file
    #[arg(long)]
    pub jd_file: Option<PathBuf>,

    /// PDF resume to analyze
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Base URL of the analysis API (overrides API_GATEWAY_URL)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Print the analysis as JSON instead of the text dashboard
    #[arg(long)]
    pub json: bool,

    /// Show the last saved analysis without submitting
    #[arg(long)]
    pub last: bool,

    /// Use --auto-save true or --auto-save false to override
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_save: bool,

    /// Location of the saved-analysis store
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Export the analysis as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}

pub async fn run(args: Cli, config: Config) -> Result<()> {
    let cache = match args.cache_file.as_deref() {
        Some(p) => ResultCache::new(p),
        None => ResultCache::default_location(),
    };

    if args.last {
        return show_last(&args, &cache).await;
    }

    let request = build_request(&args).await?;
    let coordinator = UploadCoordinator::new(config.resolve_api_base(args.api_base.as_deref()));
    run_submission(args, coordinator, request, cache).await
}

/// Assemble the submission input from CLI arguments.
async fn build_request(args: &Cli) -> Result<SubmissionRequest> {
    let job_description = match (&args.jd, &args.jd_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read job description {}", path.display()))?,
        (None, None) => String::new(),
    };

    let resume = match args.resume.as_deref() {
        Some(path) => Some(
            ResumeFile::from_path(path)
                .await
                .with_context(|| format!("read resume {}", path.display()))?,
        ),
        None => None,
    };

    Ok(SubmissionRequest {
        domain: args.domain,
        job_description,
        resume,
    })
}

async fn run_submission(
    args: Cli,
    coordinator: UploadCoordinator,
    request: SubmissionRequest,
    cache: ResultCache,
) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<SubmissionEvent>();

    let coordinator = coordinator.with_events(evt_tx);
    let handle = tokio::spawn(async move { coordinator.submit(request).await });

    while let Some(ev) = evt_rx.recv().await {
        let line = match ev {
            SubmissionEvent::PhaseStarted { phase } => format!("== {phase:?} =="),
            SubmissionEvent::Info(msg) => msg,
        };
        let _ = out_tx.send(OutputLine::Stderr(line));
    }

    let payload = match handle.await.context("submission task failed")? {
        Ok(payload) => payload,
        Err(e) => {
            drop(out_tx);
            let _ = out_handle.await;
            return Err(e.into());
        }
    };

    let processed = process_submission(
        Some(&payload),
        &cache,
        args.auto_save,
        args.export_json.as_deref(),
    )
    .await;

    emit_resolved(&args, &processed.resolved, &out_tx)?;
    for msg in processed.messages {
        let _ = out_tx.send(OutputLine::Stderr(msg));
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

async fn show_last(args: &Cli, cache: &ResultCache) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let resolved = resolve_analysis(None, cache, false).await;
    emit_resolved(args, &resolved, &out_tx)?;

    if let (Some(path), Some(result)) = (args.export_json.as_deref(), resolved.result()) {
        let _ = out_tx.send(OutputLine::Stderr(export_message(path, result)));
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Render a resolved analysis as JSON or as the text dashboard.
fn emit_resolved(
    args: &Cli,
    resolved: &ResolvedAnalysis,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    if args.json {
        let out = match resolved.result() {
            Some(result) => serde_json::to_string_pretty(result)?,
            None => "null".to_string(),
        };
        let _ = out_tx.send(OutputLine::Stdout(out));
        return Ok(());
    }

    let summary = match resolved {
        ResolvedAnalysis::Transient { result, .. } => {
            crate::text_summary::build_text_summary(result, None)
        }
        ResolvedAnalysis::Cached(entry) => {
            crate::text_summary::build_text_summary(&entry.data, Some(entry))
        }
        ResolvedAnalysis::Empty => crate::text_summary::build_empty_summary(),
    };
    for line in summary.lines {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    Ok(())
}
