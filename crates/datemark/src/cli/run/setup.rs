//! Processor setup: CLI overrides on top of the loaded config.

use datemark_core::{Config, ImageProcessor, ProcessOptions};

use super::{RunArgs, RunContext, WatermarkArgs};

/// Validate input, apply overrides, and assemble everything needed for a run.
pub fn setup_processor(args: &RunArgs, config: Config) -> anyhow::Result<RunContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    let config = apply_overrides(config, &args.watermark)?;
    let processor = ImageProcessor::new(&config);
    let options = ProcessOptions {
        output_dir: args.watermark.output_dir.clone(),
    };

    Ok(RunContext {
        processor,
        options,
        config,
    })
}

/// Apply every flag the user set, then re-validate the result.
pub fn apply_overrides(mut config: Config, args: &WatermarkArgs) -> anyhow::Result<Config> {
    if let Some(size) = args.font_size {
        config.watermark.font_size = size;
    }
    if let Some(color) = args.color {
        config.watermark.color = color;
    }
    if let Some(position) = args.position {
        config.watermark.position = position;
    }
    if let Some(font) = &args.font {
        config.watermark.font_path = Some(font.clone());
    }
    if args.no_shadow {
        config.watermark.shadow = false;
    }
    if let Some(label) = &args.no_date_label {
        config.watermark.no_date_label = label.clone();
    }
    if let Some(suffix) = &args.suffix {
        config.processing.suffix = Some(suffix.clone());
    }
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datemark_core::{Anchor, Color};
    use std::path::PathBuf;

    #[test]
    fn no_flags_keep_config() {
        let mut config = Config::default();
        config.watermark.font_size = 42;
        config.watermark.position = Anchor::TopRight;

        let merged = apply_overrides(config, &WatermarkArgs::default()).unwrap();
        assert_eq!(merged.watermark.font_size, 42);
        assert_eq!(merged.watermark.position, Anchor::TopRight);
        assert!(merged.watermark.shadow);
    }

    #[test]
    fn flags_override_config() {
        let args = WatermarkArgs {
            font_size: Some(36),
            color: Some(Color { r: 255, g: 0, b: 0 }),
            position: Some(Anchor::Center),
            font: Some(PathBuf::from("/fonts/Mono.ttf")),
            no_shadow: true,
            suffix: Some("_dated".to_string()),
            parallel: Some(4),
            no_date_label: Some("unknown".to_string()),
            ..WatermarkArgs::default()
        };

        let merged = apply_overrides(Config::default(), &args).unwrap();
        assert_eq!(merged.watermark.font_size, 36);
        assert_eq!(merged.watermark.color, Color { r: 255, g: 0, b: 0 });
        assert_eq!(merged.watermark.position, Anchor::Center);
        assert_eq!(
            merged.watermark.font_path,
            Some(PathBuf::from("/fonts/Mono.ttf"))
        );
        assert!(!merged.watermark.shadow);
        assert_eq!(merged.processing.suffix.as_deref(), Some("_dated"));
        assert_eq!(merged.processing.parallel_workers, 4);
        assert_eq!(merged.watermark.no_date_label, "unknown");
    }

    #[test]
    fn zero_font_size_is_rejected() {
        let args = WatermarkArgs {
            font_size: Some(0),
            ..WatermarkArgs::default()
        };
        assert!(apply_overrides(Config::default(), &args).is_err());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let args = WatermarkArgs {
            parallel: Some(0),
            ..WatermarkArgs::default()
        };
        assert!(apply_overrides(Config::default(), &args).is_err());
    }

    #[test]
    fn missing_input_is_fatal() {
        let args = RunArgs {
            input: PathBuf::from("/definitely/not/here"),
            watermark: WatermarkArgs::default(),
        };
        let err = setup_processor(&args, Config::default()).err().unwrap();
        assert!(err.to_string().contains("does not exist"));
    }
}
