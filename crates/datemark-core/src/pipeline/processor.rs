//! Batch driver - wires together discovery, metadata, decoding and rendering.
//!
//! Every file is handled independently: a file that cannot be read, decoded
//! or written is recorded as failed and the batch moves on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::{Config, WatermarkConfig};
use crate::error::{DatemarkError, PipelineError, PipelineResult, Result};
use crate::render::{FontProvider, FontSelector, WatermarkSpec, Watermarker};
use crate::types::{BatchReport, DateSource, FileOutcome, OutcomeStatus};

use super::decode::ImageDecoder;
use super::discovery::{DiscoveredFile, Discovery, FileDiscovery};
use super::metadata::resolve_capture_date;
use super::output_path::OutputLayout;
use super::validate::Validator;

/// Options for a single batch run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Write outputs under this directory instead of `<input>_watermark`
    pub output_dir: Option<PathBuf>,
}

/// What was stamped onto one image.
#[derive(Debug, Clone)]
pub struct Stamped {
    pub text: String,
    pub date_source: Option<DateSource>,
}

/// The main watermark processor.
#[derive(Clone)]
pub struct ImageProcessor {
    watermark: WatermarkConfig,
    suffix: Option<String>,
    parallel_workers: usize,
    render_timeout_ms: u64,
    decoder: Arc<ImageDecoder>,
    validator: Arc<Validator>,
    discovery: Arc<FileDiscovery>,
    font: Arc<dyn FontProvider>,
}

impl ImageProcessor {
    /// Create a processor, picking the best available font.
    pub fn new(config: &Config) -> Self {
        let font = FontSelector::select(config.font_path().as_deref());
        Self::with_font(config, font)
    }

    /// Create a processor that draws with a specific font.
    pub fn with_font(config: &Config, font: Arc<dyn FontProvider>) -> Self {
        Self {
            watermark: config.watermark.clone(),
            suffix: config.processing.suffix.clone(),
            parallel_workers: config.processing.parallel_workers.max(1),
            render_timeout_ms: config.limits.render_timeout_ms,
            decoder: Arc::new(ImageDecoder::new(&config.limits)),
            validator: Arc::new(Validator::new(config.limits.clone())),
            discovery: Arc::new(FileDiscovery::new(config.processing.clone())),
            font,
        }
    }

    /// Name of the font in use.
    pub fn font_name(&self) -> &str {
        self.font.name()
    }

    /// Discover all eligible image files at a path.
    pub fn discover(&self, path: &Path, exclude: Option<&Path>) -> Discovery {
        self.discovery.discover(path, exclude)
    }

    /// Resolve where outputs for `input` would go.
    pub fn output_layout(&self, input: &Path, options: &ProcessOptions) -> Result<OutputLayout> {
        if !input.exists() {
            return Err(DatemarkError::InputNotFound(input.to_path_buf()));
        }
        let input = std::fs::canonicalize(input)?;
        Ok(OutputLayout::new(
            &input,
            options.output_dir.as_deref(),
            self.suffix.clone(),
        )?)
    }

    /// Watermark every eligible image under `input`.
    pub async fn process_path(&self, input: &Path, options: &ProcessOptions) -> Result<BatchReport> {
        self.process_path_with(input, options, |_| {}).await
    }

    /// Like [`process_path`](Self::process_path), calling `on_outcome` as
    /// each file finishes.
    ///
    /// Fails only when `input` does not exist; per-file errors end up in the
    /// report.
    pub async fn process_path_with<F>(
        &self,
        input: &Path,
        options: &ProcessOptions,
        mut on_outcome: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&FileOutcome),
    {
        let start = Instant::now();
        let layout = self.output_layout(input, options)?;
        let input = std::fs::canonicalize(input)?;

        let discovery = self.discover(&input, Some(layout.root()));
        tracing::info!(
            "Found {} image(s) under {:?} ({} skipped)",
            discovery.files.len(),
            input,
            discovery.skipped
        );

        let mut outcomes = Vec::with_capacity(discovery.files.len());
        if self.parallel_workers <= 1 {
            for file in &discovery.files {
                let outcome = self.process_discovered(file, &layout).await;
                on_outcome(&outcome);
                outcomes.push(outcome);
            }
        } else {
            let semaphore = Arc::new(Semaphore::new(self.parallel_workers));
            let mut handles = Vec::with_capacity(discovery.files.len());

            for file in discovery.files.iter().cloned() {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!("Worker semaphore closed unexpectedly, stopping batch");
                        break;
                    }
                };
                let processor = self.clone();
                let layout = layout.clone();
                let input_path = file.path.clone();

                let handle = tokio::spawn(async move {
                    let outcome = processor.process_discovered(&file, &layout).await;
                    drop(permit);
                    outcome
                });
                handles.push((input_path, handle));
            }

            for (input_path, handle) in handles {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!("Worker for {:?} panicked: {e}", input_path);
                        failed_outcome(input_path, None, format!("worker panicked: {e}"))
                    }
                };
                on_outcome(&outcome);
                outcomes.push(outcome);
            }
            outcomes.sort_by(|a, b| a.input.cmp(&b.input));
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;

        Ok(BatchReport {
            output_root: layout.root().to_path_buf(),
            succeeded,
            failed,
            skipped: discovery.skipped,
            total_seconds: start.elapsed().as_secs_f64(),
            outcomes,
        })
    }

    /// Process one discovered file and turn the result into an outcome.
    async fn process_discovered(&self, file: &DiscoveredFile, layout: &OutputLayout) -> FileOutcome {
        let output = layout.output_for(&file.relative);
        if same_file(&file.path, &output) {
            let e = PipelineError::OutputIsInput(file.path.clone());
            tracing::error!("Failed: {:?} - {}", file.path, e);
            return failed_outcome(file.path.clone(), None, e.to_string());
        }

        match self.process_file(&file.path, &output).await {
            Ok(stamped) => {
                tracing::info!("Watermarked {:?} -> {:?} ({})", file.path, output, stamped.text);
                FileOutcome {
                    input: file.path.clone(),
                    output: Some(output),
                    text: Some(stamped.text),
                    date_source: stamped.date_source,
                    status: OutcomeStatus::Succeeded,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!("Failed: {:?} - {}", file.path, e);
                failed_outcome(file.path.clone(), Some(output), e.to_string())
            }
        }
    }

    /// Watermark a single image file and write the result to `output`.
    pub async fn process_file(&self, input: &Path, output: &Path) -> PipelineResult<Stamped> {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", input);

        // Validate
        self.validator.check_file(input)?;
        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| PipelineError::Decode {
                path: input.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })?;
        self.validator.check_header(input, &bytes)?;

        // Capture date (never fails)
        let capture = resolve_capture_date(&bytes);
        let text = capture.watermark_text(&self.watermark.no_date_label);
        match capture.source() {
            Some(source) => tracing::debug!("  Date {} from {}", text, source),
            None => tracing::debug!("  No capture date, using {:?}", text),
        }

        // Decode
        let decode_start = Instant::now();
        let image = self.decoder.decode(bytes, input).await?;
        tracing::trace!(
            "  Decode: {:?} ({}x{})",
            decode_start.elapsed(),
            image.width(),
            image.height()
        );

        // Render + write
        let render_start = Instant::now();
        let spec = WatermarkSpec::from_config(text.clone(), &self.watermark);
        let font = Arc::clone(&self.font);
        let output_owned = output.to_path_buf();
        let task = tokio::task::spawn_blocking(move || {
            Watermarker::new(font.as_ref()).stage(&image, &spec, &output_owned)
        });

        // A render that outlives the timeout drops its staged file unpersisted.
        let staged = match timeout(Duration::from_millis(self.render_timeout_ms), task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(PipelineError::Render {
                    path: input.to_path_buf(),
                    message: format!("Task join error: {}", e),
                })
            }
            Err(_) => {
                return Err(PipelineError::Timeout {
                    path: input.to_path_buf(),
                    stage: "render".to_string(),
                    timeout_ms: self.render_timeout_ms,
                })
            }
        };
        staged.commit()?;
        tracing::trace!("  Render: {:?}", render_start.elapsed());

        tracing::debug!("Processed {:?} in {:?}", input, start.elapsed());
        Ok(Stamped {
            text,
            date_source: capture.source(),
        })
    }
}

/// Whether writing `output` would replace `input`.
fn same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (std::fs::canonicalize(input), std::fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn failed_outcome(input: PathBuf, output: Option<PathBuf>, error: String) -> FileOutcome {
    FileOutcome {
        input,
        output,
        text: None,
        date_source: None,
        status: OutcomeStatus::Failed,
        error: Some(error),
    }
}
