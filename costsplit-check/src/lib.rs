//! costsplit-check library - allocation file checking
//!
//! Loads an employee's cost split file, optionally merges one edited
//! allocation into it, validates the result and renders a report. The binary
//! is a thin wrapper around [`check`].

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use costsplit_common::allocation::{parse_allocation, parse_allocations};
use costsplit_common::merge::merge_allocation;
use costsplit_common::summary::{format_percentage, summary_line, total_on};
use costsplit_common::validator::{peak_load, PeakLoad};
use costsplit_common::{validate_with, CostSplitAllocation, ValidationError, ValidationPolicy};
use tracing::{debug, info};

/// What to check
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    /// JSON file with the stored allocations
    pub allocations: PathBuf,
    /// JSON file with one allocation to add or edit
    pub incoming: Option<PathBuf>,
    /// JSON object mapping cost code ids to display codes
    pub codes: Option<PathBuf>,
    /// Day to summarise
    pub on: Option<NaiveDate>,
}

/// Outcome of validation
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    Rejected {
        error: ValidationError,
        /// Highest combined percentage, present for overlap rejections
        peak: Option<PeakLoad>,
    },
}

/// Allocations in effect on one day
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSummary {
    pub on: NaiveDate,
    pub total: f64,
    pub line: Option<String>,
}

/// Result of one check run
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Set that was validated (after merging any incoming allocation)
    pub candidate: Vec<CostSplitAllocation>,
    pub verdict: Verdict,
    pub summary: Option<ActiveSummary>,
}

impl CheckReport {
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }

    /// Human-readable report text
    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.verdict {
            Verdict::Accepted => {
                let count = self.candidate.len();
                let noun = if count == 1 { "cost split" } else { "cost splits" };
                let _ = writeln!(out, "OK ({} {})", count, noun);
            }
            Verdict::Rejected { error, peak } => {
                let _ = writeln!(out, "REJECTED: {}", error);
                if let Some(peak) = peak {
                    let _ = match peak.until {
                        Some(until) => writeln!(
                            out,
                            "Peak: {}% from {} until {}",
                            format_percentage(peak.percentage),
                            peak.on,
                            until
                        ),
                        None => writeln!(
                            out,
                            "Peak: {}% from {} (open-ended)",
                            format_percentage(peak.percentage),
                            peak.on
                        ),
                    };
                }
            }
        }
        if let Some(summary) = &self.summary {
            let line = summary.line.as_deref().unwrap_or("none");
            let _ = writeln!(
                out,
                "Active on {} ({}%): {}",
                summary.on,
                format_percentage(summary.total),
                line
            );
        }
        out
    }
}

/// Load an allocation document (array or `{ "splits": [...] }`)
pub fn load_allocations(path: &Path) -> Result<Vec<CostSplitAllocation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read allocations from {}", path.display()))?;
    let splits = parse_allocations(&content)
        .with_context(|| format!("Failed to parse allocations from {}", path.display()))?;
    debug!("Loaded {} cost splits from {}", splits.len(), path.display());
    Ok(splits)
}

/// Load a single allocation
pub fn load_incoming(path: &Path) -> Result<CostSplitAllocation> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read incoming allocation from {}", path.display()))?;
    parse_allocation(&content)
        .with_context(|| format!("Failed to parse incoming allocation from {}", path.display()))
}

/// Load the cost code display map
pub fn load_codes(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cost codes from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cost codes from {}", path.display()))
}

/// Run one check.
///
/// File and parse problems are errors; a rejected allocation set is a
/// successful run with a [`Verdict::Rejected`] report.
pub fn check(request: &CheckRequest, policy: &ValidationPolicy) -> Result<CheckReport> {
    let stored = load_allocations(&request.allocations)?;

    let candidate = match &request.incoming {
        Some(path) => {
            let incoming = load_incoming(path)?;
            info!(
                "Merging {} allocation for cost code {}",
                if incoming.id.is_some() { "edited" } else { "new" },
                incoming.cost_code_id
            );
            merge_allocation(&stored, &incoming)
        }
        None => stored,
    };

    let verdict = match validate_with(&candidate, policy) {
        Ok(()) => Verdict::Accepted,
        Err(error) => {
            let peak = match error {
                ValidationError::OverlapExceeds100 => peak_load(&candidate).ok(),
                _ => None,
            };
            Verdict::Rejected { error, peak }
        }
    };

    let summary = match request.on {
        Some(on) => {
            let codes = match &request.codes {
                Some(path) => load_codes(path)?,
                None => BTreeMap::new(),
            };
            Some(ActiveSummary {
                on,
                total: total_on(&candidate, on),
                line: summary_line(&candidate, on, &codes),
            })
        }
        None => None,
    };

    Ok(CheckReport { candidate, verdict, summary })
}
