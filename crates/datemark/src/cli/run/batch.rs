//! Batch execution with a progress bar, and the closing summary.

use std::path::Path;
use std::time::Instant;

use datemark_core::BatchReport;

use super::RunContext;

/// Watermark everything under `input`, showing progress for multi-file runs.
pub async fn run_batch(ctx: &RunContext, input: &Path) -> anyhow::Result<BatchReport> {
    // Count up front so the bar has a length
    let layout = ctx.processor.output_layout(input, &ctx.options)?;
    let canonical = std::fs::canonicalize(input)?;
    let total = ctx.processor.discover(&canonical, Some(layout.root())).files.len();
    if total == 0 {
        tracing::warn!("No supported image files found at {:?}", input);
    }

    let progress = if total > 1 {
        create_progress_bar(total as u64)
    } else {
        indicatif::ProgressBar::hidden()
    };
    let start_time = Instant::now();
    let mut done: u64 = 0;

    let report = ctx
        .processor
        .process_path_with(input, &ctx.options, |_outcome| {
            done += 1;
            progress.inc(1);
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
            }
        })
        .await?;

    progress.finish_and_clear();
    Ok(report)
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print the summary table (and any failures) to stderr.
pub fn print_summary(report: &BatchReport) {
    let processed = report.succeeded + report.failed;
    let rate = if report.total_seconds > 0.0 {
        processed as f64 / report.total_seconds
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("         Watermarking complete");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", report.succeeded);
    if report.failed > 0 {
        eprintln!("    Failed:       {:>8}", report.failed);
    }
    if report.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", report.skipped);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", processed + report.skipped);
    eprintln!("    Duration:     {:>7.1}s", report.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
    if report.succeeded > 0 {
        eprintln!("  Output: {}", report.output_root.display());
    }

    for outcome in report.outcomes.iter().filter(|o| !o.is_success()) {
        eprintln!(
            "  ✗ {}: {}",
            outcome.input.display(),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
}
