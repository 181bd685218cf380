//! Research aggregator.
//!
//! Walks the labs in input order, pulls candidates from the provider one at
//! a time and keeps at most `max_per_lab` normalized publications per lab.

use crate::config::PipelineConfig;
use crate::normalize::{normalize, NormalizeError, Publication};
use crate::provider::ResearchProvider;
use crate::reader::LabRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A lab together with its accepted publications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchGroup {
    pub lab: String,
    pub lab_id: String,
    /// In provider order
    pub publications: Vec<Publication>,
}

impl ResearchGroup {
    fn new(lab: &LabRecord) -> Self {
        Self {
            lab: lab.lab.clone(),
            lab_id: lab.lab_id.clone(),
            publications: Vec::new(),
        }
    }
}

/// Drives a [`ResearchProvider`] over a list of labs
pub struct Aggregator<'a> {
    provider: &'a dyn ResearchProvider,
    max_per_lab: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(provider: &'a dyn ResearchProvider, config: &PipelineConfig) -> Self {
        Self {
            provider,
            max_per_lab: config.max_per_lab,
        }
    }

    /// Gather research for every lab, in order.
    ///
    /// Labs the provider cannot resolve are left out of the result; labs
    /// with no usable publications are kept with an empty list.
    pub async fn gather(&self, labs: &[LabRecord]) -> Vec<ResearchGroup> {
        info!(
            labs = labs.len(),
            provider = self.provider.name(),
            max_per_lab = self.max_per_lab,
            "Gathering research"
        );

        let mut groups = Vec::with_capacity(labs.len());
        for lab in labs {
            if let Some(group) = self.gather_lab(lab).await {
                groups.push(group);
            }
        }

        info!(
            resolved = groups.len(),
            skipped = labs.len() - groups.len(),
            "Done gathering research"
        );
        groups
    }

    /// Gather research for a single lab, `None` if it could not be resolved.
    pub async fn gather_lab(&self, lab: &LabRecord) -> Option<ResearchGroup> {
        debug!(lab = %lab.lab, id = %lab.lab_id, "Trying lab");

        let mut handle = match self.provider.resolve(&lab.lab_id).await {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                warn!(lab = %lab.lab, id = %lab.lab_id, "Lab unresolved by provider; skipping");
                return None;
            }
            Err(e) => {
                warn!(lab = %lab.lab, id = %lab.lab_id, error = %e, "Failed to fill lab; skipping");
                return None;
            }
        };

        if let Some(name) = handle.display_name() {
            debug!(lab = %lab.lab, profile = name, "Resolved lab");
        }

        let mut group = ResearchGroup::new(lab);
        let mut inspected = 0usize;

        while group.publications.len() < self.max_per_lab {
            let Some(candidate) = handle.next_candidate().await else {
                break;
            };
            inspected += 1;

            let raw = match candidate {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(lab = %lab.lab, error = %e, "Failed to fill publication; skipping");
                    continue;
                }
            };

            match normalize(&raw) {
                Ok(publication) => group.publications.push(publication),
                Err(e @ (NormalizeError::MissingTitle | NormalizeError::MissingYear)) => {
                    debug!(lab = %lab.lab, reason = %e, "Skipping incomplete publication");
                }
                Err(e) => {
                    warn!(
                        lab = %lab.lab,
                        title = raw.title.as_deref().unwrap_or_default(),
                        reason = %e,
                        "Skipping publication"
                    );
                }
            }
        }

        info!(
            lab = %lab.lab,
            accepted = group.publications.len(),
            inspected,
            "Collected publications"
        );
        Some(group)
    }
}
