//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use docmerge_core::{extract_tags, BatchSummary, Pipeline, Settings};
use docmerge_ooxml::Template;

/// Output format for tag listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One tag per line
    #[default]
    Text,
    /// JSON object with the template path and its tags
    Json,
}

#[derive(Parser)]
#[command(name = "docmerge")]
#[command(author, version, about = "Fill Word templates from spreadsheet cells", long_about = None)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a DOCX template from one or more spreadsheets
    Fill {
        /// Template DOCX file
        template: PathBuf,

        /// Spreadsheets to process, in order
        #[arg(required = true)]
        spreadsheets: Vec<PathBuf>,

        /// Output directory (overrides the configuration file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path (default: ./docmerge.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Suffix for filled documents
        #[arg(long)]
        document_suffix: Option<String>,

        /// Suffix for report files
        #[arg(long)]
        report_suffix: Option<String>,
    },

    /// List the placeholders a template references
    Tags {
        /// Template DOCX file
        template: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Options for the fill command
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    pub template: PathBuf,
    pub spreadsheets: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub document_suffix: Option<String>,
    pub report_suffix: Option<String>,
}

impl FillOptions {
    /// Settings from the configuration file with command-line overrides
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(output) = &self.output {
            settings.output.directory = output.clone();
        }
        if let Some(suffix) = &self.document_suffix {
            settings.output.document_suffix = suffix.clone();
        }
        if let Some(suffix) = &self.report_suffix {
            settings.output.report_suffix = suffix.clone();
        }
        Ok(settings)
    }
}

#[derive(Serialize)]
struct TagListing<'a> {
    template: String,
    tags: &'a [String],
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Fill {
            template,
            spreadsheets,
            output,
            config,
            document_suffix,
            report_suffix,
        } => {
            let options = FillOptions {
                template,
                spreadsheets,
                output,
                config,
                document_suffix,
                report_suffix,
            };
            let summary = fill_command(&options)?;
            if !summary.failed.is_empty() {
                anyhow::bail!(
                    "{} of {} spreadsheet(s) failed",
                    summary.failed.len(),
                    summary.total
                );
            }
        }
        Commands::Tags { template, format } => {
            tags_command(&template, format)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` takes precedence
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the fill command
pub fn fill_command(options: &FillOptions) -> Result<BatchSummary> {
    println!("docmerge v{}", docmerge_core::VERSION);

    if !options.template.exists() {
        anyhow::bail!("Template file not found: {}", options.template.display());
    }

    let settings = options.settings()?;
    tracing::debug!(?settings, "effective settings");
    println!("Template: {}", options.template.display());
    println!("Output:   {}", settings.output.directory.display());
    println!();

    let pipeline = Pipeline::new(settings);
    let summary = pipeline.run(&options.template, &options.spreadsheets, &|line: &str| {
        println!("{}", line)
    });

    if !summary.succeeded.is_empty() {
        println!();
        println!("Generated files:");
        for outcome in &summary.succeeded {
            println!("  {}", outcome.document.display());
            println!("  {}", outcome.report.display());
        }
    }

    Ok(summary)
}

/// Execute the tags command
pub fn tags_command(template_path: &Path, format: OutputFormat) -> Result<Vec<String>> {
    if !template_path.exists() {
        anyhow::bail!("Template file not found: {}", template_path.display());
    }

    let template = Template::load(template_path)
        .with_context(|| format!("Failed to open template: {}", template_path.display()))?;
    let tags = extract_tags(&template);

    match format {
        OutputFormat::Json => {
            let listing = TagListing {
                template: template_path.display().to_string(),
                tags: &tags,
            };
            let json = serde_json::to_string_pretty(&listing)
                .context("Failed to serialize tags to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if tags.is_empty() {
                println!("No tags found in {}", template_path.display());
            }
            for tag in &tags {
                println!("{}", tag);
            }
        }
    }

    Ok(tags)
}
