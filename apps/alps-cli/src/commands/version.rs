//! Version information command

use anyhow::Result;
use colored::Colorize;

use crate::output::{format_output, OutputFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run(format: OutputFormat) -> Result<()> {
    let version_info = VersionInfo {
        cli_version: VERSION.to_string(),
        git_commit: option_env!("GIT_COMMIT").map(String::from),
        rust_version: option_env!("RUST_VERSION").map(String::from),
    };

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            println!("{}", format_output(&version_info, format)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "alps".cyan().bold(), VERSION.green());

            if let Some(commit) = &version_info.git_commit {
                println!("  Git Commit: {}", &commit[..7.min(commit.len())]);
            }
            if let Some(rust) = &version_info.rust_version {
                println!("  Rust: {}", rust);
            }
        }
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct VersionInfo {
    cli_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    git_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rust_version: Option<String>,
}
