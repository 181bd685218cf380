//! Publication normalizer.
//!
//! Turns one [`RawPublication`] into a [`Publication`]. Title and year are
//! required; authors and publisher fall back to [`NOT_AVAILABLE`].

use crate::provider::RawPublication;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Placeholder for optional fields the provider did not supply
pub const NOT_AVAILABLE: &str = "n/a";

/// A normalized publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub authors: String,
    pub year: i32,
    pub citations: u64,
    pub publisher: String,
}

/// Reasons a raw record cannot become a [`Publication`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("publication has no title")]
    MissingTitle,

    #[error("publication has no year")]
    MissingYear,

    #[error("publication year '{0}' is not an integer")]
    InvalidYear(String),
}

/// Normalize a raw provider record.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the title or year is absent, or the year
/// does not parse as an integer.
pub fn normalize(raw: &RawPublication) -> Result<Publication, NormalizeError> {
    let title = non_blank(raw.title.as_deref()).ok_or(NormalizeError::MissingTitle)?;
    let year_text = non_blank(raw.year.as_deref()).ok_or(NormalizeError::MissingYear)?;
    let year = year_text
        .parse::<i32>()
        .map_err(|_| NormalizeError::InvalidYear(year_text.to_string()))?;

    let authors = non_blank(raw.author.as_deref());
    let publisher = non_blank(raw.publisher.as_deref());
    if authors.is_none() || publisher.is_none() {
        debug!(title, "Publication was missing author or publisher information");
    }

    Ok(Publication {
        title: title.to_string(),
        authors: authors.unwrap_or(NOT_AVAILABLE).to_string(),
        year,
        citations: total_citations(&raw.cites_per_year),
        publisher: publisher.unwrap_or(NOT_AVAILABLE).to_string(),
    })
}

/// Sum a per-year citation history into one count.
pub fn total_citations(cites_per_year: &BTreeMap<i32, u64>) -> u64 {
    cites_per_year
        .values()
        .fold(0u64, |total, count| total.saturating_add(*count))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: Option<&str>, year: Option<&str>) -> RawPublication {
        RawPublication {
            title: title.map(String::from),
            author: Some("A Smith, B Jones".to_string()),
            year: year.map(String::from),
            publisher: Some("IEEE".to_string()),
            cites_per_year: BTreeMap::new(),
        }
    }

    #[test]
    fn test_citation_sum() {
        let history = BTreeMap::from([(2019, 3), (2020, 5), (2021, 0)]);
        assert_eq!(total_citations(&history), 8);
        assert_eq!(total_citations(&BTreeMap::new()), 0);
    }

    #[test]
    fn test_citation_sum_saturates() {
        let history = BTreeMap::from([(2019, u64::MAX), (2020, 5)]);
        assert_eq!(total_citations(&history), u64::MAX);
    }

    #[test]
    fn test_full_record() {
        let mut record = raw(Some("Deep Tissue Imaging"), Some(" 2019 "));
        record.cites_per_year = BTreeMap::from([(2019, 3), (2020, 5), (2021, 0)]);

        let publication = normalize(&record).expect("normalize failed");
        assert_eq!(
            publication,
            Publication {
                title: "Deep Tissue Imaging".to_string(),
                authors: "A Smith, B Jones".to_string(),
                year: 2019,
                citations: 8,
                publisher: "IEEE".to_string(),
            }
        );
    }

    #[test]
    fn test_fallback_fields() {
        let record = RawPublication {
            title: Some("Untitled Preprint".to_string()),
            year: Some("2021".to_string()),
            ..Default::default()
        };

        let publication = normalize(&record).expect("normalize failed");
        assert_eq!(publication.authors, NOT_AVAILABLE);
        assert_eq!(publication.publisher, NOT_AVAILABLE);
        assert_eq!(publication.citations, 0);
    }

    #[test]
    fn test_blank_optional_fields_fall_back() {
        let mut record = raw(Some("Paper"), Some("2020"));
        record.author = Some("   ".to_string());
        let publication = normalize(&record).expect("normalize failed");
        assert_eq!(publication.authors, NOT_AVAILABLE);
        assert_eq!(publication.publisher, "IEEE");
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(normalize(&raw(None, Some("2020"))), Err(NormalizeError::MissingTitle));
        assert_eq!(normalize(&raw(Some(""), Some("2020"))), Err(NormalizeError::MissingTitle));
        assert_eq!(normalize(&raw(Some("Paper"), None)), Err(NormalizeError::MissingYear));
        assert_eq!(
            normalize(&raw(Some("Paper"), Some("forthcoming"))),
            Err(NormalizeError::InvalidYear("forthcoming".to_string()))
        );
    }
}
