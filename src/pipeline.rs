//! End-to-end run: read labs, gather research, write the report.

use crate::aggregate::Aggregator;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::provider::ResearchProvider;
use crate::reader::read_labs;
use crate::writer::write_report;
use std::path::Path;
use tracing::info;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub labs_read: usize,
    pub groups_written: usize,
    pub publications_written: usize,
}

/// Run the whole pipeline.
///
/// The input is read before anything is written, so a missing input file
/// leaves no output file behind.
///
/// # Errors
///
/// Fails only if the input cannot be read or the report cannot be written.
pub async fn run(
    input: &Path,
    output: &Path,
    provider: &dyn ResearchProvider,
    config: &PipelineConfig,
) -> Result<RunSummary> {
    let labs = read_labs(input)?;

    let groups = Aggregator::new(provider, config).gather(&labs).await;

    info!(path = %output.display(), "Creating the output file");
    write_report(output, &groups, &config.writer_options())?;

    Ok(RunSummary {
        labs_read: labs.len(),
        groups_written: groups.len(),
        publications_written: groups.iter().map(|g| g.publications.len()).sum(),
    })
}
