//! om-image: prepare product photos and registration requests for upload.

use clap::{Parser, Subcommand, ValueEnum};
use openmarket_core::config::Config;
use openmarket_core::Error;
use openmarket_register::Currency;
use openmarket_telemetry::TelemetryConfig;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{batch, detect, prepare, register, PrepareOverrides};

/// Product photo preparation for OpenMarket
#[derive(Parser)]
#[command(name = "om-image")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to .openmarket.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable
    Text,
    /// One JSON document on stdout
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Square-crop and compress one photo under the byte budget
    Prepare {
        /// Photo to prepare
        input: PathBuf,

        /// Output file (defaults to <input>-upload.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: PrepareOverrides,
    },

    /// Prepare every photo under a directory
    Batch {
        /// Directory to scan
        dir: PathBuf,

        /// Where prepared photos are written
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        overrides: PrepareOverrides,
    },

    /// Detect a photo's format from its leading bytes
    Detect {
        /// Path to image file
        path: PathBuf,
    },

    /// Validate a product draft, prepare its photos and write the upload body
    Register {
        /// Product draft as JSON (name, price, discounted_price, stock, description)
        #[arg(short, long)]
        draft: PathBuf,

        /// Listing currency
        #[arg(long, default_value = "KRW")]
        currency: Currency,

        /// Photos, in slot order (up to five)
        images: Vec<PathBuf>,

        /// File the multipart request body is written to
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    init_logging(&config, cli.verbose);

    let prepare_config = &config.schema.prepare;
    let result = match cli.command {
        Commands::Prepare {
            input,
            output,
            overrides,
        } => prepare::run(&input, output.as_deref(), &overrides, prepare_config, cli.format),

        Commands::Batch {
            dir,
            out_dir,
            quiet,
            overrides,
        } => batch::run(&dir, &out_dir, quiet, &overrides, prepare_config, cli.format),

        Commands::Detect { path } => detect::run(&path, cli.format),

        Commands::Register {
            draft,
            currency,
            images,
            out,
        } => register::run(&draft, currency, &images, &out, prepare_config, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let logging = &config.schema.logging;
    let telemetry = TelemetryConfig {
        log_level: if verbose {
            "debug".to_string()
        } else {
            logging.level.clone()
        },
        show_target: logging.show_target,
    };
    if let Err(e) = openmarket_telemetry::init_with_config(telemetry) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }
}

fn fail(error: &Error) -> ExitCode {
    eprintln!("{} {}", "Error:".red().bold(), error);
    ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(1))
}
