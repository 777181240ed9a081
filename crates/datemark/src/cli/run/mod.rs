//! The `datemark run` command (also the default when only a path is given).

mod batch;
mod setup;

use clap::Args;
use datemark_core::{Anchor, Color, Config, ImageProcessor, ProcessOptions};
use std::path::PathBuf;

use batch::{print_summary, run_batch};
use setup::setup_processor;

/// Watermark appearance and output options.
///
/// Every option left unset keeps the value from the config file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct WatermarkArgs {
    /// Font size in pixels [default: 20]
    #[arg(short = 's', long, value_name = "N")]
    pub font_size: Option<u32>,

    /// Text color: white, black, red, green, blue, yellow, orange, gray, `R,G,B` or `#RRGGBB` [default: white]
    #[arg(short, long, value_name = "COLOR", value_parser = parse_color)]
    pub color: Option<Color>,

    /// Corner to anchor the date to: top-left, top-right, bottom-left, bottom-right, center [default: bottom-right]
    #[arg(short, long, value_name = "POSITION", value_parser = parse_position)]
    pub position: Option<Anchor>,

    /// TrueType font file (defaults to a system font, then a built-in bitmap font)
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Draw the text without a drop shadow
    #[arg(long)]
    pub no_shadow: bool,

    /// Suffix added to output file names, before the extension
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Output directory (defaults to `<input>_watermark` next to the input)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of images processed concurrently [default: 1]
    #[arg(long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Write a JSON report of every processed file to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Text stamped on images without a usable capture date [default: "no date"]
    #[arg(long, value_name = "TEXT")]
    pub no_date_label: Option<String>,
}

impl WatermarkArgs {
    /// Fill every option left unset here from `outer`.
    pub fn or(self, outer: WatermarkArgs) -> WatermarkArgs {
        WatermarkArgs {
            font_size: self.font_size.or(outer.font_size),
            color: self.color.or(outer.color),
            position: self.position.or(outer.position),
            font: self.font.or(outer.font),
            no_shadow: self.no_shadow || outer.no_shadow,
            suffix: self.suffix.or(outer.suffix),
            output_dir: self.output_dir.or(outer.output_dir),
            parallel: self.parallel.or(outer.parallel),
            report: self.report.or(outer.report),
            no_date_label: self.no_date_label.or(outer.no_date_label),
        }
    }
}

/// Strict position parsing; the config file falls back to bottom-right
/// instead.
fn parse_position(s: &str) -> Result<Anchor, String> {
    s.parse()
}

fn parse_color(s: &str) -> Result<Color, String> {
    s.parse()
}

/// Arguments for the `run` command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Image file or directory to watermark
    #[arg(required = true)]
    pub input: PathBuf,

    #[command(flatten)]
    pub watermark: WatermarkArgs,
}

/// Everything needed for a batch run, assembled by setup_processor().
pub(crate) struct RunContext {
    pub processor: ImageProcessor,
    pub options: ProcessOptions,
    pub config: Config,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_processor(&args, config)?;
    tracing::debug!(
        "Font: {}, position: {}, size: {}",
        ctx.processor.font_name(),
        ctx.config.watermark.position,
        ctx.config.watermark.font_size
    );

    let report = run_batch(&ctx, &args.input).await?;

    if let Some(path) = &args.watermark.report {
        report.write_json(path)?;
        tracing::info!("Report written to {:?}", path);
    }

    print_summary(&report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermark_args_default_overrides_nothing() {
        let args = WatermarkArgs::default();
        assert!(args.font_size.is_none());
        assert!(args.color.is_none());
        assert!(args.position.is_none());
        assert!(args.font.is_none());
        assert!(!args.no_shadow);
        assert!(args.suffix.is_none());
        assert!(args.output_dir.is_none());
        assert!(args.parallel.is_none());
        assert!(args.report.is_none());
        assert!(args.no_date_label.is_none());
    }

    #[test]
    fn inner_options_win_over_outer() {
        let inner = WatermarkArgs {
            font_size: Some(40),
            ..WatermarkArgs::default()
        };
        let outer = WatermarkArgs {
            font_size: Some(12),
            position: Some(Anchor::TopLeft),
            no_shadow: true,
            ..WatermarkArgs::default()
        };

        let merged = inner.or(outer);
        assert_eq!(merged.font_size, Some(40));
        assert_eq!(merged.position, Some(Anchor::TopLeft));
        assert!(merged.no_shadow);
        assert!(merged.color.is_none());
    }

    #[test]
    fn position_parser_is_strict() {
        assert_eq!(parse_position("top_left"), Ok(Anchor::TopLeft));
        assert_eq!(parse_position("bottom-right"), Ok(Anchor::BottomRight));
        assert!(parse_position("upper-middle").is_err());
    }

    #[test]
    fn color_parser_accepts_names_and_triples() {
        assert_eq!(parse_color("white"), Ok(Color::WHITE));
        assert_eq!(parse_color("10,20,30"), Ok(Color { r: 10, g: 20, b: 30 }));
        assert!(parse_color("300,0,0").is_err());
    }

    #[tokio::test]
    async fn execute_missing_input_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            input: dir.path().join("nope"),
            watermark: WatermarkArgs::default(),
        };

        let result = execute(args, Config::default()).await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn execute_writes_outputs_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photos");
        std::fs::create_dir(&input).unwrap();
        image::RgbImage::new(80, 60)
            .save(input.join("a.png"))
            .unwrap();
        let report_path = dir.path().join("report.json");

        let args = RunArgs {
            input: input.clone(),
            watermark: WatermarkArgs {
                report: Some(report_path.clone()),
                ..WatermarkArgs::default()
            },
        };
        execute(args, Config::default()).await.unwrap();

        assert!(dir.path().join("photos_watermark/a.png").is_file());
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report["succeeded"], 1);
        assert_eq!(report["outcomes"][0]["text"], "no date");
    }
}
