//! labscholar - Lab publication report generator
//!
//! Reads a `Lab, LabID, URL` spreadsheet, gathers each lab's publications and
//! writes a flattened CSV report.
//!
//! ## Usage
//!
//! ```bash
//! labscholar -i data/labs.csv -o output/research.csv
//! labscholar -i data/labs.csv -o output/research.csv --source fixture --fixture data/labs.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use labscholar::config::{DataSource, PipelineConfig};
use labscholar::fixture::FixtureProvider;
use labscholar::gscholar::{self, ScholarProvider};
use labscholar::pipeline;
use labscholar::provider::ResearchProvider;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Gather lab publications from Google Scholar into a CSV report
#[derive(Parser)]
#[command(name = "labscholar")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input CSV with Lab, LabID, URL columns
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV report
    #[arg(short, long)]
    output: PathBuf,

    /// Maximum publications kept per lab
    #[arg(long, default_value_t = labscholar::config::DEFAULT_MAX_PER_LAB)]
    max_per_lab: usize,

    /// Data source: live or fixture
    #[arg(long, default_value = "live", value_parser = ["live", "fixture"])]
    source: String,

    /// Fixture JSON file (required with --source fixture)
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Truncate author lists longer than this many characters
    #[arg(long)]
    truncate_authors: Option<usize>,

    /// Proxy URL (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    proxy: Option<String>,

    /// Mirror site URL
    #[arg(long)]
    mirror: Option<String>,

    /// Cookie file exported from a browser session
    #[arg(long)]
    cookies: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let config = PipelineConfig {
        max_per_lab: cli.max_per_lab,
        data_source: cli.source.parse()?,
        fixture_path: cli.fixture.clone(),
        author_max_chars: cli.truncate_authors,
    };
    config.validate()?;

    let provider = build_provider(&cli, &config)?;

    info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        source = %config.data_source,
        "Starting research run"
    );

    let summary = pipeline::run(&cli.input, &cli.output, provider.as_ref(), &config)
        .await
        .context("Research run failed")?;

    info!(
        labs = summary.labs_read,
        written = summary.groups_written,
        publications = summary.publications_written,
        "Done! Go check out {}",
        cli.output.display()
    );
    Ok(())
}

fn build_provider(cli: &Cli, config: &PipelineConfig) -> Result<Box<dyn ResearchProvider>> {
    match config.data_source {
        DataSource::Fixture => {
            let path = config
                .fixture_path
                .as_deref()
                .context("Fixture source selected without a fixture path")?;
            let provider = FixtureProvider::from_path(path).context("Failed to load fixture")?;
            Ok(Box::new(provider))
        }
        DataSource::Live => {
            let options = gscholar::QueryOptions {
                proxy: cli.proxy.clone(),
                base_url: cli.mirror.clone(),
                cookie_path: cli.cookies.clone(),
            };
            let provider =
                ScholarProvider::new(&options).context("Failed to set up Google Scholar client")?;
            Ok(Box::new(provider))
        }
    }
}
