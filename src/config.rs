//! Pipeline configuration.
//!
//! Replaces global debug toggles: the data source and the per-lab cap are
//! explicit values handed to the aggregator and writer at construction.

use crate::error::{ResearchError, Result};
use crate::writer::WriterOptions;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default accepted-count cap per lab
pub const DEFAULT_MAX_PER_LAB: usize = 10;

/// Where publication records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// Live Google Scholar author profiles
    #[default]
    Live,
    /// Offline JSON fixture file
    Fixture,
}

impl FromStr for DataSource {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "fixture" => Ok(Self::Fixture),
            other => Err(ResearchError::Config(format!(
                "Unknown data source '{}', expected 'live' or 'fixture'",
                other
            ))),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Fixture => f.write_str("fixture"),
        }
    }
}

/// Options for one research-gathering run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of successfully normalized publications kept per lab
    pub max_per_lab: usize,
    /// Provider backing the run
    pub data_source: DataSource,
    /// Fixture file, required when `data_source` is `Fixture`
    pub fixture_path: Option<PathBuf>,
    /// Cut author strings longer than this many characters in the report
    pub author_max_chars: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_per_lab: DEFAULT_MAX_PER_LAB,
            data_source: DataSource::Live,
            fixture_path: None,
            author_max_chars: None,
        }
    }
}

impl PipelineConfig {
    /// Check cross-field requirements before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.data_source == DataSource::Fixture && self.fixture_path.is_none() {
            return Err(ResearchError::Config(
                "--source fixture requires --fixture <file>".to_string(),
            ));
        }
        if self.author_max_chars == Some(0) {
            return Err(ResearchError::Config(
                "--truncate-authors must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Writer formatting options derived from this configuration
    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            author_max_chars: self.author_max_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_from_str() {
        assert_eq!("live".parse::<DataSource>().ok(), Some(DataSource::Live));
        assert_eq!(" Fixture ".parse::<DataSource>().ok(), Some(DataSource::Fixture));
        assert!("shelve".parse::<DataSource>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_per_lab, 10);
        assert_eq!(config.data_source, DataSource::Live);
        assert!(config.writer_options().author_max_chars.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixture_requires_path() {
        let mut config = PipelineConfig {
            data_source: DataSource::Fixture,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ResearchError::Config(_))));

        config.fixture_path = Some(PathBuf::from("fixtures/labs.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_truncation_rejected() {
        let config = PipelineConfig {
            author_max_chars: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
