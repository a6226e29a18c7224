// WHY: Reports are independent, so each one is marked up on its own blocking worker.
// Only the annotator (read-only) and the global regex cache are shared between workers.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::annotator::Annotator;
use crate::document::Document;

/// Configuration for batch processing behavior
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Abort the batch on the first failed report instead of recording it
    pub fail_fast: bool,
    /// Maximum number of reports in flight
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            workers: num_cpus::get().max(1),
        }
    }
}

/// A report's identifier and full text
#[derive(Debug, Clone)]
pub struct Report {
    pub id: String,
    pub text: String,
}

impl Report {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Per-report processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReportStats {
    /// Report identifier (file path for file input)
    pub report_id: String,
    /// Number of characters in the report text
    pub chars_processed: u64,
    pub sentences: u64,
    pub targets: u64,
    pub modifiers: u64,
    /// Edges in the document graph
    pub relationships: u64,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Processing status (success, failed)
    pub status: String,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl ReportStats {
    fn failed(report_id: &str, error: &anyhow::Error) -> Self {
        Self {
            report_id: report_id.to_string(),
            chars_processed: 0,
            sentences: 0,
            targets: 0,
            modifiers: 0,
            relationships: 0,
            processing_time_ms: 0,
            status: "failed".to_string(),
            error: Some(format!("{:#}", error)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of one report; `document` is `None` when processing failed
#[derive(Debug)]
pub struct ProcessedReport {
    pub stats: ReportStats,
    pub document: Option<Document>,
}

/// Mark up one report on a blocking worker
async fn markup_report(annotator: Arc<Annotator>, report: Report) -> Result<ProcessedReport> {
    let report_id = report.id.clone();
    tokio::task::spawn_blocking(move || {
        let start_time = Instant::now();
        let document = annotator
            .markup_document(&report.text)
            .with_context(|| format!("Failed to mark up report {}", report.id))?;

        let graph = document.document_graph();
        let (targets, modifiers) = graph.mode_counts();
        let stats = ReportStats {
            report_id: report.id.clone(),
            chars_processed: report.text.chars().count() as u64,
            sentences: document.sentence_count() as u64,
            targets: targets as u64,
            modifiers: modifiers as u64,
            relationships: graph.edge_count() as u64,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            status: "success".to_string(),
            error: None,
        };
        debug!(report = %stats.report_id, sentences = stats.sentences, "processed report");

        Ok(ProcessedReport {
            stats,
            document: Some(document),
        })
    })
    .await
    .with_context(|| format!("Worker for report {} panicked", report_id))?
}

/// Drive jobs with bounded concurrency, keeping input order
async fn run_batch<F>(jobs: Vec<(String, F)>, config: &BatchConfig) -> Result<Vec<ProcessedReport>>
where
    F: Future<Output = Result<ProcessedReport>>,
{
    let total = jobs.len();
    let mut results = Vec::with_capacity(total);
    let mut failed = 0usize;

    let mut outcomes = stream::iter(jobs)
        .map(|(report_id, job)| async move { (report_id, job.await) })
        .buffered(config.workers.max(1));

    while let Some((report_id, outcome)) = outcomes.next().await {
        match outcome {
            Ok(processed) => results.push(processed),
            Err(e) => {
                if config.fail_fast {
                    return Err(e.context(format!("Batch aborted at report {}", report_id)));
                }
                warn!("Report {} failed: {:#}", report_id, e);
                failed += 1;
                results.push(ProcessedReport {
                    stats: ReportStats::failed(&report_id, &e),
                    document: None,
                });
            }
        }
    }

    info!("Completed batch of {} reports: {} successful, {} failed", total, total - failed, failed);
    Ok(results)
}

/// Mark up in-memory reports; results are in input order
pub async fn process_reports(
    annotator: Arc<Annotator>,
    reports: Vec<Report>,
    config: &BatchConfig,
) -> Result<Vec<ProcessedReport>> {
    info!("Starting batch of {} reports with {} workers", reports.len(), config.workers);
    let jobs = reports
        .into_iter()
        .map(|report| (report.id.clone(), markup_report(Arc::clone(&annotator), report)))
        .collect();
    run_batch(jobs, config).await
}

async fn read_and_markup(annotator: Arc<Annotator>, path: PathBuf) -> Result<ProcessedReport> {
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    markup_report(annotator, Report::new(path.display().to_string(), text)).await
}

/// Read report files asynchronously and mark them up; read failures follow `fail_fast`
pub async fn process_report_files<P: AsRef<Path>>(
    annotator: Arc<Annotator>,
    paths: &[P],
    config: &BatchConfig,
) -> Result<Vec<ProcessedReport>> {
    info!("Starting batch of {} report files with {} workers", paths.len(), config.workers);
    let jobs = paths
        .iter()
        .map(|path| {
            let path = path.as_ref().to_path_buf();
            (path.display().to_string(), read_and_markup(Arc::clone(&annotator), path))
        })
        .collect();
    run_batch(jobs, config).await
}
