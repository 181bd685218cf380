//! # labscholar
//!
//! Reads a spreadsheet of labs, collects each lab's publications from Google
//! Scholar author profiles and writes a flattened CSV report.
//!
//! ## Modules
//!
//! - [`reader`] - Lab spreadsheet parsing
//! - [`provider`] - Provider traits shared by all data sources
//! - [`gscholar`] - Live Google Scholar author profile provider
//! - [`fixture`] - Offline JSON fixture provider
//! - [`normalize`] - Raw record to publication conversion
//! - [`aggregate`] - Per-lab accumulation with a publication cap
//! - [`writer`] - Flattened CSV report
//! - [`pipeline`] - Read, gather, write
//! - [`cookies`] - Browser cookie export loading
//! - [`config`] - Run configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use labscholar::{config::PipelineConfig, fixture::FixtureProvider, pipeline};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = FixtureProvider::from_path(Path::new("fixtures/labs.json"))?;
//!     let summary = pipeline::run(
//!         Path::new("data/labs.csv"),
//!         Path::new("output/research.csv"),
//!         &provider,
//!         &PipelineConfig::default(),
//!     )
//!     .await?;
//!     println!("Wrote {} labs", summary.groups_written);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod cookies;
pub mod error;
pub mod fixture;
pub mod gscholar;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod reader;
pub mod writer;

pub use error::{ResearchError, Result};
