//! Research provider abstraction.
//!
//! The aggregator only talks to a [`ResearchProvider`]; the live Google
//! Scholar scraper and the offline fixture both implement it.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A publication as returned by a provider. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPublication {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Publication year as text, coerced by the normalizer
    pub year: Option<String>,
    pub publisher: Option<String>,
    /// Citations received per calendar year
    #[serde(default)]
    pub cites_per_year: BTreeMap<i32, u64>,
}

/// Source of publication records for labs.
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Look up a lab by its provider id.
    ///
    /// `Ok(None)` means the id is unknown to the provider. Errors mean the
    /// lab could not be filled; both are per-lab skips for the caller.
    async fn resolve(&self, lab_id: &str) -> Result<Option<Box<dyn LabHandle>>>;
}

/// A resolved lab whose publications are fetched on demand.
#[async_trait]
pub trait LabHandle: Send {
    /// Provider-side display name of the lab, if known
    fn display_name(&self) -> Option<&str> {
        None
    }

    /// Next candidate publication in provider order.
    ///
    /// Returns `None` once the publication list is exhausted. An `Err` item
    /// is a candidate whose details could not be filled; iteration may
    /// continue after it.
    async fn next_candidate(&mut self) -> Option<Result<RawPublication>>;
}
