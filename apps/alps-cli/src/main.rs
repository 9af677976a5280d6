//! ALPS Parser CLI
//!
//! Extracts and validates the feature-level specification of ALPS documents.

mod commands;
mod output;
mod telemetry;

use alps_core::AlpsError;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "alps",
    author = "ALPS Trail Team",
    version,
    about = "ALPS Parser - structured extraction of ALPS feature specifications",
    long_about = "Reads an ALPS markdown document, extracts Section 6 (Feature-Level\n\
                  Specification), enriches every subsection through a structured-extraction\n\
                  backend and validates the result."
)]
struct Cli {
    /// Output format (text, json, yaml)
    #[arg(short, long, global = true, default_value = "text", value_parser = ["text", "json", "yaml"])]
    format: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "ALPS_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an ALPS document and validate its feature section
    Process {
        /// Path to the ALPS markdown document
        file: PathBuf,

        /// Write the JSON or YAML rendering to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the rule-based extractor instead of a hosted model
        #[arg(long)]
        offline: bool,

        /// Maximum extraction calls in flight
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Require the section heading to mention the configured title
        #[arg(long)]
        verify_title: bool,

        /// Configuration file (environment variables still override it)
        #[arg(short, long, env = "ALPS_CONFIG")]
        config: Option<String>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let log_level = if cli.verbose { "info" } else { cli.log_level.as_str() };
    if let Err(e) = telemetry::init_telemetry(log_level, cli.json_logs) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        return ExitCode::FAILURE;
    }

    let format = match cli.format.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Process {
            file,
            output,
            offline,
            concurrency,
            verify_title,
            config,
        } => {
            commands::process::run(commands::process::ProcessArgs {
                file,
                output,
                offline,
                concurrency,
                verify_title,
                config,
                format,
                verbose: cli.verbose,
            })
            .await
        }
        Commands::Version => commands::version::run(format),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AlpsError>() {
                Some(parse_error) => eprintln!(
                    "{} [{}]: {}",
                    "Parsing error".red().bold(),
                    parse_error.category(),
                    parse_error
                ),
                None => eprintln!("{}: {}", "Error".red().bold(), e),
            }
            if cli.verbose {
                for cause in e.chain().skip(1) {
                    eprintln!("{}: {}", "Caused by".yellow(), cause);
                }
            }
            ExitCode::FAILURE
        }
    }
}
