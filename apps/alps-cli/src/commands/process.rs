//! Document processing command

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

use alps_adapters::AnthropicExtractor;
use alps_core::{AppConfig, Document, StructuredExtractor, ValidationReport};
use alps_ingestion::{AlpsParser, HeuristicExtractor};

use crate::output::{self, format_output, OutputFormat};

/// Options for `alps process`
pub struct ProcessArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub offline: bool,
    pub concurrency: Option<usize>,
    pub verify_title: bool,
    pub config: Option<String>,
    pub format: OutputFormat,
    pub verbose: bool,
}

#[derive(Serialize)]
struct ProcessReport<'a> {
    document: &'a Document,
    validation: &'a ValidationReport,
}

pub async fn run(args: ProcessArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(concurrency) = args.concurrency {
        config.parser = config.parser.with_max_concurrency(concurrency);
    }
    if args.verify_title {
        config.parser = config.parser.with_title_verification(true);
    }

    let extractor: Arc<dyn StructuredExtractor> = if args.offline {
        Arc::new(HeuristicExtractor::new())
    } else {
        if !config.llm.has_api_key() {
            if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
                config.llm.api_key = key;
            }
        }
        Arc::new(
            AnthropicExtractor::from_config(&config.llm)
                .context("Failed to configure extraction backend (use --offline to run without one)")?,
        )
    };

    info!(
        file = %args.file.display(),
        extractor = extractor.name(),
        max_concurrency = config.parser.max_concurrency,
        "Processing ALPS document"
    );

    let parser = AlpsParser::from_configs(extractor, config.parser.clone(), &config.llm);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let spinner = (args.format == OutputFormat::Text).then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Parsing {}...", args.file.display()));
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    });

    let start = Instant::now();
    let parsed = parser.parse_document_with_cancel(&args.file, cancel).await;

    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    let document = parsed?;
    let validation = parser.validate(&document);
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let report = ProcessReport {
        document: &document,
        validation: &validation,
    };

    if let Some(path) = &args.output {
        let file_format = match args.format {
            OutputFormat::Yaml => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        };
        let rendered = format_output(&report, file_format)?;
        tokio::fs::write(path, rendered)
            .await
            .with_context(|| format!("Failed to write output to {}", path.display()))?;
    }

    match args.format {
        OutputFormat::Json | OutputFormat::Yaml => {
            if args.output.is_none() {
                println!("{}", format_output(&report, args.format)?);
            }
        }
        OutputFormat::Text => {
            print_summary(&parser, &document, &validation, args.verbose);

            if let Some(path) = &args.output {
                output::dimmed(&format!("Wrote {}", path.display()));
            }
            output::dimmed(&format!("Finished in {}", output::format_duration(elapsed_ms)));
        }
    }

    Ok(())
}

fn print_summary(
    parser: &AlpsParser,
    document: &Document,
    validation: &ValidationReport,
    verbose: bool,
) {
    let number = parser.config().target_section.to_string();
    let metadata = document.metadata();

    println!("Parsed document with {} sections", document.sections().len());

    if let Some(section) = document.section(&number) {
        println!(
            "Section {} has {} subsections",
            number,
            section.subsections.len()
        );

        if verbose {
            output::section(&format!("Section {}: {}", section.number, section.title));
            for subsection in &section.subsections {
                let complexity = subsection.complexity.as_deref().unwrap_or("-");
                output::list_item(&format!(
                    "{} {} [{}]",
                    subsection.number,
                    output::truncate(&subsection.title, 60),
                    complexity
                ));
            }
            println!();
            output::key_value("Source", &metadata.source);
            output::key_value("Encoding", &metadata.encoding);
            output::key_value("Parse ID", &metadata.parse_id.to_string());
        }
    }

    for failure in &metadata.enrichment_failures {
        output::warning(&format!(
            "Dropped block {} ({}): {}",
            failure.block_index + 1,
            output::truncate(&failure.heading, 60),
            failure.reason
        ));
    }

    if validation.is_valid {
        output::success("Validation: Passed");
    } else {
        output::failure("Validation: Failed");
        for issue in &validation.issues {
            output::list_item(issue);
        }
    }
}
