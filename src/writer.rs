//! Flattening CSV writer.
//!
//! Each [`ResearchGroup`] becomes one header-marker row followed by one
//! detail row per publication.

use crate::aggregate::ResearchGroup;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// CSV column order for the report
pub const OUTPUT_COLUMNS: &[&str] = &[
    "Lab",
    "Lab ID",
    "Publications",
    "Title",
    "Author",
    "Year",
    "Cited By",
    "Publisher",
];

/// Placeholder in the `Publications` column of a lab header row
pub const PUBLICATIONS_MARKER: &str = "...";

/// Presentation options for the report
#[derive(Debug, Clone, Default)]
pub struct WriterOptions {
    /// Cut author strings longer than this many characters and append "..."
    pub author_max_chars: Option<usize>,
}

/// One flat report row: either a lab header or a publication detail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub lab: String,
    pub lab_id: String,
    pub publications: String,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub cited_by: Option<u64>,
    pub publisher: String,
}

/// Flatten groups into report rows, preserving group and publication order.
pub fn flatten(groups: &[ResearchGroup], options: &WriterOptions) -> Vec<OutputRow> {
    let mut rows = Vec::new();
    for group in groups {
        rows.push(OutputRow {
            lab: group.lab.clone(),
            lab_id: group.lab_id.clone(),
            publications: PUBLICATIONS_MARKER.to_string(),
            ..Default::default()
        });

        rows.extend(group.publications.iter().map(|p| OutputRow {
            title: p.title.clone(),
            author: format_authors(&p.authors, options.author_max_chars),
            year: Some(p.year),
            cited_by: Some(p.citations),
            publisher: p.publisher.clone(),
            ..Default::default()
        }));
    }
    rows
}

/// Truncate an author list to `max_chars` characters, if a limit is set.
pub fn format_authors(authors: &str, max_chars: Option<usize>) -> String {
    match max_chars {
        Some(limit) if authors.chars().count() > limit => {
            let mut cut: String = authors.chars().take(limit).collect();
            cut.push_str("...");
            cut
        }
        _ => authors.to_string(),
    }
}

/// Write the report to any sink.
pub fn write_research<W: Write>(
    sink: W,
    groups: &[ResearchGroup],
    options: &WriterOptions,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(sink);

    wtr.write_record(OUTPUT_COLUMNS)?;
    for row in flatten(groups, options) {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the report to `path`, replacing any existing file.
pub fn write_report(path: &Path, groups: &[ResearchGroup], options: &WriterOptions) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    write_research(std::io::BufWriter::new(file), groups, options)?;

    let publications: usize = groups.iter().map(|g| g.publications.len()).sum();
    info!(path = %path.display(), labs = groups.len(), publications, "Saved report");
    Ok(())
}
