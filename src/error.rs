//! Error types for labscholar.
//!
//! Library functions return `Result<T, ResearchError>`. Only the input file
//! errors are meant to stop a run; everything the provider raises is handled
//! per lab or per publication by the aggregator.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for labscholar operations.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Input spreadsheet does not exist
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML or fixture parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limited by the provider
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Provider returned an HTTP error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// CAPTCHA detected
    #[error("CAPTCHA detected, please refresh cookies")]
    Captcha,

    /// Provider could not fill a publication's bibliographic fields
    #[error("Fill error: {0}")]
    Fill(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `ResearchError`
pub type Result<T> = std::result::Result<T, ResearchError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| ResearchError::Parse(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_not_found_message() {
        let err = ResearchError::InputNotFound(PathBuf::from("data/labs.csv"));
        assert_eq!(err.to_string(), "Input file not found: data/labs.csv");
    }

    #[test]
    fn test_ok_or_parse() {
        let missing: Option<i32> = None;
        assert!(matches!(
            missing.ok_or_parse("no value"),
            Err(ResearchError::Parse(msg)) if msg == "no value"
        ));
        assert_eq!(Some(3).ok_or_parse("unused").ok(), Some(3));
    }
}
