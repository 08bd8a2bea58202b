//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use billscan_core::{BillscanConfig, DocumentFormat, InvoiceDocument, InvoicePipeline, RawDocument};

use super::config::load_config;
use super::output::{render, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files
    #[arg(required = true)]
    input: String,

    /// Output directory (default: one JSON line per file on stdout)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file written to the output directory
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    document: Option<InvoiceDocument>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = Arc::new(load_config(config_path)?);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut pending = stream::iter(files)
        .map(|path| {
            let config = Arc::clone(&config);
            async move {
                let file_start = Instant::now();
                let task_path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || process_file(&task_path, &config)).await;
                let outcome = match outcome {
                    Ok(result) => result,
                    Err(join_error) => Err(anyhow::anyhow!("worker failed: {}", join_error)),
                };
                (path, outcome, file_start.elapsed().as_millis() as u64)
            }
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some((path, outcome, processing_time_ms)) = pending.next().await {
        overall_pb.inc(1);
        let outcome = outcome.and_then(|document| emit(&path, &document, &args).map(|()| document));
        match record(path, outcome, processing_time_ms, args.continue_on_error) {
            Ok(result) => results.push(result),
            Err(e) => {
                overall_pb.abandon();
                return Err(e);
            }
        }
    }

    overall_pb.finish_and_clear();
    results.sort_by(|a, b| a.path.cmp(&b.path));

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Turn a per-file outcome into a result row. A failure ends the batch
/// unless `continue_on_error` is set.
fn record(
    path: PathBuf,
    outcome: anyhow::Result<InvoiceDocument>,
    processing_time_ms: u64,
    continue_on_error: bool,
) -> anyhow::Result<ProcessResult> {
    match outcome {
        Ok(document) => Ok(ProcessResult {
            path,
            document: Some(document),
            error: None,
            processing_time_ms,
        }),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            if !continue_on_error {
                error!("Failed to process {}: {}", path.display(), error_msg);
                anyhow::bail!("Processing {} failed: {}", path.display(), error_msg);
            }
            warn!("Failed to process {}: {}", path.display(), error_msg);
            Ok(ProcessResult {
                path,
                document: None,
                error: Some(error_msg),
                processing_time_ms,
            })
        }
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DocumentFormat::from_tag(ext).is_ok())
}

/// Runs on the blocking pool with its own pipeline and temp directories.
fn process_file(path: &Path, config: &BillscanConfig) -> anyhow::Result<InvoiceDocument> {
    let document = RawDocument::from_path(path)?;
    let pipeline = InvoicePipeline::from_config(config)?;
    Ok(pipeline.process(&document)?)
}

/// Write one result to the output directory, or to stdout as a JSON line.
fn emit(path: &Path, document: &InvoiceDocument, args: &BatchArgs) -> anyhow::Result<()> {
    match &args.output_dir {
        Some(output_dir) => {
            let output_path = output_dir.join(output_file_name(path, args.format));
            fs::write(&output_path, render(document, args.format, true)?)
                .with_context(|| format!("writing {}", output_path.display()))?;
            debug!("Wrote output to {}", output_path.display());
        }
        None => {
            let line = serde_json::json!({
                "file": path.display().to_string(),
                "result": document,
            });
            println!("{}", line);
        }
    }
    Ok(())
}

/// Output name keeps the source extension so `a.pdf` and `a.png` do not
/// collide: `a.pdf.json`, `a.png.json`.
fn output_file_name(path: &Path, format: OutputFormat) -> String {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("invoice");
    format!("{}.{}", name, format.extension())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor_name",
        "bill_number",
        "created_date",
        "due_date",
        "items",
        "expenses",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(document) = &result.document {
            let data = &document.structured_data;
            wtr.write_record([
                filename,
                "success",
                data.vendor_info.name.as_deref().unwrap_or_default(),
                data.bill_info.bill_number.as_deref().unwrap_or_default(),
                data.dates.created_date.as_deref().unwrap_or_default(),
                data.dates.due_date.as_deref().unwrap_or_default(),
                &data.items.len().to_string(),
                &data.expenses.len().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
