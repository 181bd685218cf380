//! Input spreadsheet reader.
//!
//! Reads the `Lab, LabID, URL` CSV into [`LabRecord`]s. Columns are
//! positional; the header row is only checked for a plausible shape.

use crate::error::{ResearchError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Number of positional columns a lab row must carry
const LAB_COLUMNS: usize = 3;

/// One lab row from the input spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabRecord {
    /// Display name of the lab or professor
    pub lab: String,
    /// Provider identifier (Google Scholar user id)
    pub lab_id: String,
    /// Lab homepage
    pub url: String,
}

/// Read lab records from a CSV file.
///
/// # Errors
///
/// Returns [`ResearchError::InputNotFound`] if the file does not exist, and
/// `Io`/`Csv` errors if it cannot be read at all. Malformed rows are skipped.
pub fn read_labs(path: &Path) -> Result<Vec<LabRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ResearchError::InputNotFound(path.to_path_buf()),
        _ => ResearchError::Io(e),
    })?;

    info!(path = %path.display(), "Reading lab spreadsheet");
    read_labs_from(file)
}

/// Read lab records from any CSV source. The first record is the header.
pub fn read_labs_from<R: Read>(source: R) -> Result<Vec<LabRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut labs = Vec::new();
    let mut records = reader.records();

    match records.next() {
        Some(Ok(header)) => check_header(&header),
        Some(Err(e)) if is_row_error(&e) => {
            warn!(error = %e, "Header row is unreadable; continuing positionally");
        }
        Some(Err(e)) => return Err(e.into()),
        None => {
            warn!("Input is empty, no labs to process");
            return Ok(labs);
        }
    }

    for (index, record) in records.enumerate() {
        // header is line 1
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) if is_row_error(&e) => {
                warn!(line, error = %e, "Malformed row; skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if record.len() < LAB_COLUMNS {
            warn!(
                line,
                fields = record.len(),
                row = ?record.iter().collect::<Vec<_>>(),
                "Malformed row, expected Lab, ID, URL; skipping"
            );
            continue;
        }

        let lab = LabRecord {
            lab: record[0].to_string(),
            lab_id: record[1].to_string(),
            url: record[2].to_string(),
        };

        if lab.lab_id.is_empty() {
            warn!(line, lab = %lab.lab, "Row has no lab ID; skipping");
            continue;
        }

        debug!(line, lab = %lab.lab, id = %lab.lab_id, url = %lab.url, "Read lab");
        labs.push(lab);
    }

    info!(count = labs.len(), "Processed lab rows, now gathering research");
    Ok(labs)
}

/// Decode failures scoped to one record; the reader can move past them.
fn is_row_error(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Utf8 { .. })
}

/// Warn when the header does not look like `Lab, ID, URL`.
fn check_header(header: &csv::StringRecord) {
    let expected = ["lab", "id", "url"];
    let matches = header.len() >= LAB_COLUMNS
        && header
            .iter()
            .zip(expected)
            .all(|(name, want)| name.to_ascii_lowercase().contains(want));

    if !matches {
        warn!(
            columns = %header.iter().collect::<Vec<_>>().join(", "),
            "Column names should be Lab, ID, URL (in that order); continuing positionally"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_malformed_row_skipped() -> Result<()> {
        let input = "Lab,ID,URL\nLabA,L1\nLabB,L2,http://x\n";
        let labs = read_labs_from(input.as_bytes())?;
        assert_eq!(
            labs,
            vec![LabRecord {
                lab: "LabB".to_string(),
                lab_id: "L2".to_string(),
                url: "http://x".to_string(),
            }]
        );
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_row_skipped() -> Result<()> {
        let input: &[u8] =
            b"Lab,ID,URL\nLabA,L1,http://a\nLab\xff\xfe,L2,http://b\nLabC,L3,http://c\n";
        let ids: Vec<String> = read_labs_from(input)?
            .into_iter()
            .map(|l| l.lab_id)
            .collect();
        assert_eq!(ids, vec!["L1", "L3"]);
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_header_is_not_fatal() -> Result<()> {
        let input: &[u8] = b"Lab\xff,ID,URL\nLabA,L1,http://a\n";
        let labs = read_labs_from(input)?;
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].lab, "LabA");
        Ok(())
    }

    #[test]
    fn test_empty_lab_id_skipped() -> Result<()> {
        let input = "Lab,LabID,URL\nLabA,,http://a\nLabB,L2,http://b\n";
        let labs = read_labs_from(input.as_bytes())?;
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].lab_id, "L2");
        Ok(())
    }

    #[test]
    fn test_mismatched_header_is_not_fatal() -> Result<()> {
        let input = "Name,Website\nLabA, abc123 ,http://a,extra\n";
        let labs = read_labs_from(input.as_bytes())?;
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].lab, "LabA");
        assert_eq!(labs[0].lab_id, "abc123");
        assert_eq!(labs[0].url, "http://a");
        Ok(())
    }

    #[test]
    fn test_preserves_input_order() -> Result<()> {
        let input = "Lab,ID,URL\nC,3,u\nA,1,u\nB,2,u\n";
        let ids: Vec<String> = read_labs_from(input.as_bytes())?
            .into_iter()
            .map(|l| l.lab_id)
            .collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        Ok(())
    }

    #[test]
    fn test_empty_input() -> Result<()> {
        assert!(read_labs_from("".as_bytes())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_file_not_found() {
        let result = read_labs(Path::new("/nonexistent/labs.csv"));
        assert!(matches!(result, Err(ResearchError::InputNotFound(p)) if p.ends_with("labs.csv")));
    }

    #[test]
    fn test_read_from_file() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "Lab,LabID,URL")?;
        writeln!(temp, "Bioengineering Lab,qc6CJjYAAAAJ,https://example.edu/bio")?;

        let labs = read_labs(temp.path())?;
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].lab, "Bioengineering Lab");
        Ok(())
    }
}
