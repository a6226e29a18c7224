use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use contextmark::lexicon::loader::read_lexicon_async;
use contextmark::{process_report_files, Annotator, AnnotatorConfig, BatchConfig};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// ConTextDocument XML per report
    Xml,
    /// JSON summary per report
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "contextmark")]
#[command(about = "Mark up clinical reports with ConText targets and modifiers")]
#[command(version)]
struct Args {
    /// Target lexicon (.tsv or .csv)
    #[arg(long)]
    targets: PathBuf,

    /// Modifier lexicon (.tsv or .csv)
    #[arg(long)]
    modifiers: PathBuf,

    /// Annotator configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Xml)]
    format: OutputFormat,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Number of reports processed concurrently (default: CPU count)
    #[arg(long)]
    workers: Option<usize>,

    /// Stats output file path
    #[arg(long)]
    stats_out: Option<PathBuf>,

    /// Report text files
    #[arg(required = true)]
    reports: Vec<PathBuf>,
}

async fn load_config(path: Option<&PathBuf>) -> Result<AnnotatorConfig> {
    let Some(path) = path else {
        return Ok(AnnotatorConfig::default());
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the markup output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    let targets = read_lexicon_async(&args.targets).await?;
    let modifiers = read_lexicon_async(&args.modifiers).await?;
    let config = load_config(args.config.as_ref()).await?;
    let annotator = Arc::new(Annotator::new(targets, modifiers).with_config(config));

    let mut batch_config = BatchConfig {
        fail_fast: args.fail_fast,
        ..BatchConfig::default()
    };
    if let Some(workers) = args.workers {
        batch_config.workers = workers.max(1);
    }

    let results = process_report_files(Arc::clone(&annotator), &args.reports[..], &batch_config).await?;

    for result in &results {
        let Some(document) = &result.document else {
            continue;
        };
        match args.format {
            OutputFormat::Xml => print!("{}", document.to_xml()),
            OutputFormat::Json => {
                let summary = annotator.summarize(document);
                let line = serde_json::json!({ "report": result.stats.report_id, "summary": summary });
                println!("{}", line);
            }
        }
    }

    if let Some(stats_out) = &args.stats_out {
        let stats: Vec<_> = results.iter().map(|r| &r.stats).collect();
        let json = serde_json::to_string_pretty(&stats)?;
        tokio::fs::write(stats_out, json)
            .await
            .with_context(|| format!("Failed to write stats {}", stats_out.display()))?;
    }

    let failed = results.iter().filter(|r| !r.stats.is_success()).count();
    info!("Processed {} reports: {} failed", results.len(), failed);
    Ok(())
}
