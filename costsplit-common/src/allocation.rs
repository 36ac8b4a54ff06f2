//! Cost split allocation model
//!
//! A cost split states that a percentage of an employee's labour cost goes
//! to one cost code for an effective date window.

use serde::{Deserialize, Serialize};

use crate::dates::{parse_date, EffectiveWindow};
use crate::{Error, Result};

/// One date-effective percentage allocation to a cost code
///
/// Dates are kept as submitted so that the validator can report which field
/// failed to parse. Field names follow the JSON wire format
/// (`costCodeId`, `startDate`, `endDate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSplitAllocation {
    /// Identifier of a persisted allocation, `None` for a new one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Target cost code (opaque, not checked for existence)
    pub cost_code_id: String,
    /// Share of cost in percent, 0 to 100
    pub percentage: f64,
    /// Inclusive effective start
    pub start_date: String,
    /// Inclusive effective end, `None` when open-ended
    #[serde(default)]
    pub end_date: Option<String>,
}

impl CostSplitAllocation {
    /// Create a new open-ended allocation without an id
    pub fn new(cost_code_id: impl Into<String>, percentage: f64, start_date: impl Into<String>) -> Self {
        Self {
            id: None,
            cost_code_id: cost_code_id.into(),
            percentage,
            start_date: start_date.into(),
            end_date: None,
        }
    }

    /// Set the identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Close the window on an inclusive end date
    pub fn ending(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    /// End date text, treating a blank string the same as no end date
    pub fn end_text(&self) -> Option<&str> {
        self.end_date.as_deref().filter(|text| !text.trim().is_empty())
    }

    /// Parsed effective window, `None` if either date is unparseable
    ///
    /// Does not check that the end follows the start; the validator does.
    pub fn window(&self) -> Option<EffectiveWindow> {
        let start = parse_date(&self.start_date)?;
        let end = match self.end_text() {
            Some(text) => Some(parse_date(text)?),
            None => None,
        };
        Some(EffectiveWindow { start, end })
    }
}

/// Accepted shapes of an allocation file
#[derive(Deserialize)]
#[serde(untagged)]
enum AllocationDocument {
    List(Vec<CostSplitAllocation>),
    Upsert { splits: Vec<CostSplitAllocation> },
}

/// Parse a JSON allocation document.
///
/// Accepts either a bare array of allocations or the bulk upsert body
/// `{ "splits": [...] }`.
pub fn parse_allocations(json: &str) -> Result<Vec<CostSplitAllocation>> {
    let document: AllocationDocument = serde_json::from_str(json)
        .map_err(|e| Error::InvalidInput(format!("Malformed allocation document: {}", e)))?;

    Ok(match document {
        AllocationDocument::List(splits) => splits,
        AllocationDocument::Upsert { splits } => splits,
    })
}

/// Parse a single JSON allocation
pub fn parse_allocation(json: &str) -> Result<CostSplitAllocation> {
    serde_json::from_str(json)
        .map_err(|e| Error::InvalidInput(format!("Malformed allocation: {}", e)))
}
