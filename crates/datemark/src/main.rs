//! Datemark CLI - stamp each photo's capture date onto a watermarked copy.
//!
//! Datemark reads the EXIF capture date of every image under a path, draws it
//! as `YYYY-MM-DD` in a corner of the picture, and writes the result into a
//! sibling `<input>_watermark` directory. Originals are never touched.
//!
//! # Usage
//!
//! ```bash
//! # Watermark a directory (writes ./photos_watermark/)
//! datemark ./photos
//!
//! # Same thing, explicit subcommand, with a few options
//! datemark run ./photos --position top-left --color yellow --font-size 32
//!
//! # View configuration
//! datemark config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Datemark - stamp each photo's capture date onto a watermarked copy.
#[derive(Parser, Debug)]
#[command(name = "datemark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Image file or directory to watermark
    input: Option<std::path::PathBuf>,

    #[command(flatten)]
    watermark: cli::run::WatermarkArgs,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark images with their capture date (default command)
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match datemark_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `datemark config path`."
            );
            datemark_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Datemark v{}", datemark_core::VERSION);

    match resolve_command(cli)? {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

/// The command to run, with options given before the subcommand folded into
/// it. Options written after `run` take precedence.
fn resolve_command(cli: Cli) -> anyhow::Result<Commands> {
    match cli.command {
        Some(Commands::Run(mut args)) => {
            if let Some(input) = cli.input {
                anyhow::bail!(
                    "Input {} given before `run`; pass it after the subcommand instead",
                    input.display()
                );
            }
            args.watermark = args.watermark.or(cli.watermark);
            Ok(Commands::Run(args))
        }
        Some(Commands::Config(args)) => {
            if cli.input.is_some() || cli.watermark != cli::run::WatermarkArgs::default() {
                anyhow::bail!("Watermark options and inputs do not apply to `config`");
            }
            Ok(Commands::Config(args))
        }
        None => {
            let Some(input) = cli.input else {
                anyhow::bail!("No input given.\n\n  Usage: datemark <INPUT> (see `datemark --help`)");
            };
            Ok(Commands::Run(cli::run::RunArgs {
                input,
                watermark: cli.watermark,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_input_is_default_command() {
        let cli = Cli::try_parse_from(["datemark", "photos", "-p", "top-left"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.input, Some(PathBuf::from("photos")));
        assert_eq!(
            cli.watermark.position,
            Some(datemark_core::Anchor::TopLeft)
        );
    }

    #[test]
    fn run_subcommand_parses() {
        let cli = Cli::try_parse_from(["datemark", "-v", "run", "photos", "--parallel", "4"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.input, PathBuf::from("photos"));
                assert_eq!(args.watermark.parallel, Some(4));
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn invalid_color_is_rejected_by_parser() {
        let err = Cli::try_parse_from(["datemark", "photos", "--color", "mauve-ish"]);
        assert!(err.is_err());
    }

    #[test]
    fn invalid_position_is_rejected_by_parser() {
        let err = Cli::try_parse_from(["datemark", "photos", "--position", "middle"]);
        assert!(err.is_err());
    }

    #[test]
    fn options_before_run_are_applied() {
        let cli = Cli::try_parse_from([
            "datemark",
            "-s",
            "40",
            "--no-shadow",
            "run",
            "photos",
            "-p",
            "top-left",
        ])
        .unwrap();
        match resolve_command(cli).unwrap() {
            Commands::Run(args) => {
                assert_eq!(args.input, PathBuf::from("photos"));
                assert_eq!(args.watermark.font_size, Some(40));
                assert!(args.watermark.no_shadow);
                assert_eq!(args.watermark.position, Some(datemark_core::Anchor::TopLeft));
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn options_after_run_take_precedence() {
        let cli =
            Cli::try_parse_from(["datemark", "-s", "12", "run", "photos", "-s", "40"]).unwrap();
        match resolve_command(cli).unwrap() {
            Commands::Run(args) => assert_eq!(args.watermark.font_size, Some(40)),
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn watermark_options_with_config_are_rejected() {
        let cli = Cli::try_parse_from(["datemark", "-s", "40", "config", "show"]).unwrap();
        assert!(resolve_command(cli).is_err());
    }

    #[test]
    fn bare_input_resolves_to_run() {
        let cli = Cli::try_parse_from(["datemark", "photos", "-s", "30"]).unwrap();
        match resolve_command(cli).unwrap() {
            Commands::Run(args) => {
                assert_eq!(args.input, PathBuf::from("photos"));
                assert_eq!(args.watermark.font_size, Some(30));
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn missing_input_is_an_error() {
        let cli = Cli::try_parse_from(["datemark", "-v"]).unwrap();
        assert!(resolve_command(cli).is_err());
    }

    #[test]
    fn config_subcommand_parses() {
        let cli = Cli::try_parse_from(["datemark", "config", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config(_))));
    }
}
