//! Fixture-backed research provider.
//!
//! Serves publication records from a JSON document so runs and tests do not
//! touch the network. Layout:
//!
//! ```json
//! {
//!   "labs": {
//!     "qc6CJjYAAAAJ": {
//!       "name": "Bioengineering Lab",
//!       "publications": [
//!         { "title": "...", "author": "...", "year": 2019,
//!           "publisher": "...", "cites_per_year": { "2019": 3 } },
//!         { "title": "...", "fill_error": "timed out" }
//!       ]
//!     }
//!   }
//! }
//! ```

use crate::error::{ResearchError, Result};
use crate::provider::{LabHandle, RawPublication, ResearchProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Root of a fixture file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureData {
    #[serde(default)]
    pub labs: HashMap<String, FixtureLab>,
}

/// One lab in a fixture file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureLab {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub publications: Vec<FixturePublication>,
}

/// One candidate publication in a fixture file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixturePublication {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// String or number; kept loose so malformed years can be expressed
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub cites_per_year: BTreeMap<i32, u64>,
    /// When set, the candidate fails to fill with this message
    #[serde(default)]
    pub fill_error: Option<String>,
}

impl FixturePublication {
    fn to_raw(&self) -> Result<RawPublication> {
        if let Some(message) = &self.fill_error {
            return Err(ResearchError::Fill(message.clone()));
        }

        let year = self.year.as_ref().and_then(|value| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });

        Ok(RawPublication {
            title: self.title.clone(),
            author: self.author.clone(),
            year,
            publisher: self.publisher.clone(),
            cites_per_year: self.cites_per_year.clone(),
        })
    }
}

/// Provider serving labs from [`FixtureData`]
#[derive(Debug, Default)]
pub struct FixtureProvider {
    data: FixtureData,
    inspected: Arc<AtomicUsize>,
}

impl FixtureProvider {
    /// Create a provider from in-memory data
    pub fn new(data: FixtureData) -> Self {
        Self {
            data,
            inspected: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Load a fixture JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResearchError::Config(format!("Cannot read fixture {}: {}", path.display(), e))
        })?;
        let data: FixtureData = serde_json::from_str(&content)?;
        info!(path = %path.display(), labs = data.labs.len(), "Loaded fixture data");
        Ok(Self::new(data))
    }

    /// Add or replace a lab
    pub fn with_lab(
        mut self,
        lab_id: &str,
        name: &str,
        publications: Vec<FixturePublication>,
    ) -> Self {
        self.data.labs.insert(
            lab_id.to_string(),
            FixtureLab {
                name: Some(name.to_string()),
                publications,
            },
        );
        self
    }

    /// Total candidates handed out across all labs
    pub fn inspected(&self) -> usize {
        self.inspected.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ResearchProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn resolve(&self, lab_id: &str) -> Result<Option<Box<dyn LabHandle>>> {
        let Some(lab) = self.data.labs.get(lab_id) else {
            debug!(lab_id, "Lab not present in fixture");
            return Ok(None);
        };

        Ok(Some(Box::new(FixtureLabHandle {
            name: lab.name.clone(),
            pending: lab.publications.iter().cloned().collect(),
            inspected: Arc::clone(&self.inspected),
        })))
    }
}

struct FixtureLabHandle {
    name: Option<String>,
    pending: VecDeque<FixturePublication>,
    inspected: Arc<AtomicUsize>,
}

#[async_trait]
impl LabHandle for FixtureLabHandle {
    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn next_candidate(&mut self) -> Option<Result<RawPublication>> {
        let publication = self.pending.pop_front()?;
        self.inspected.fetch_add(1, Ordering::Relaxed);
        Some(publication.to_raw())
    }
}
