//! Overlap validation for date-effective cost splits
//!
//! For every calendar day, the percentages of all allocations whose window
//! covers that day must not add up to more than the limit (100%, with a
//! small tolerance for floating point drift).
//!
//! Instead of comparing allocations pairwise, each allocation contributes an
//! opening event (`+percentage`) and a closing event (`-percentage`). The
//! events are sorted along the timeline and swept once while keeping a
//! running total. Events on the same boundary apply additions before
//! removals, so ties are always evaluated at their worst case.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::allocation::CostSplitAllocation;
use crate::dates::{parse_date, Boundary, EffectiveWindow};
use crate::error::{DateField, ValidationError};

/// Upper bound on a single allocation's percentage
pub const MAX_PERCENTAGE: f64 = 100.0;

/// Tolerance absorbed when comparing the running total against the limit
pub const DEFAULT_EPSILON: f64 = 0.0001;

/// Limits applied by [`validate_with`]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Highest total allowed on any single day
    pub max_total_percentage: f64,
    /// Rounding tolerance added to `max_total_percentage`
    pub epsilon: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_total_percentage: MAX_PERCENTAGE,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ValidationPolicy {
    fn ceiling(&self) -> f64 {
        self.max_total_percentage + self.epsilon
    }
}

/// Highest combined percentage found by [`peak_load`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakLoad {
    /// Combined percentage at the peak
    pub percentage: f64,
    /// First day on which the peak is reached
    pub on: NaiveDate,
    /// Last day of that first peak window, `None` when it never ends
    pub until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy)]
struct SweepEvent {
    at: Boundary,
    change: f64,
}

/// Validate an allocation set with the default policy.
///
/// Fails on an empty set, on an allocation with an unparseable date, an end
/// before its start or a percentage outside 0 to 100, and when the
/// allocations covering any one day add up to more than 100%.
///
/// # Examples
///
/// ```
/// use costsplit_common::{validate, CostSplitAllocation, ValidationError};
///
/// let splits = vec![
///     CostSplitAllocation::new("A", 60.0, "2024-01-01"),
///     CostSplitAllocation::new("B", 40.0, "2024-01-01"),
/// ];
/// assert!(validate(&splits).is_ok());
///
/// let splits = vec![
///     CostSplitAllocation::new("A", 60.0, "2024-01-01"),
///     CostSplitAllocation::new("B", 50.0, "2024-01-01"),
/// ];
/// assert_eq!(validate(&splits), Err(ValidationError::OverlapExceeds100));
/// ```
pub fn validate(allocations: &[CostSplitAllocation]) -> Result<(), ValidationError> {
    validate_with(allocations, &ValidationPolicy::default())
}

/// Validate an allocation set against an explicit policy
pub fn validate_with(
    allocations: &[CostSplitAllocation],
    policy: &ValidationPolicy,
) -> Result<(), ValidationError> {
    debug!("Validating {} cost splits", allocations.len());

    let events = sweep_events(allocations)?;
    let ceiling = policy.ceiling();

    let mut current = 0.0;
    for event in &events {
        current += event.change;
        if current > ceiling {
            warn!(
                "Cost split total {:.4}% exceeds {}% at {:?}",
                current, policy.max_total_percentage, event.at
            );
            return Err(ValidationError::OverlapExceeds100);
        }
    }

    Ok(())
}

/// Find the highest combined percentage across the timeline.
///
/// Applies the same per-allocation checks as [`validate`] but never fails on
/// the total, so callers can report how far over the limit a rejected set
/// goes and over which days.
pub fn peak_load(allocations: &[CostSplitAllocation]) -> Result<PeakLoad, ValidationError> {
    let events = sweep_events(allocations)?;

    let mut current = 0.0;
    let mut peak: Option<(usize, PeakLoad)> = None;
    for (index, event) in events.iter().enumerate() {
        current += event.change;
        // Only openings raise the total, and openings are always dated
        if let Boundary::At { day, .. } = event.at {
            if peak.map_or(true, |(_, p)| current > p.percentage) {
                peak = Some((index, PeakLoad { percentage: current, on: day, until: None }));
            }
        }
    }

    // The set is non-empty, so the first opening always records a peak
    let (index, mut peak) = peak.ok_or(ValidationError::EmptyAllocationSet)?;

    // The peak lasts until the first closing that lowers the total
    peak.until = events[index + 1..]
        .iter()
        .find(|event| event.change < 0.0)
        .and_then(|event| match event.at {
            Boundary::At { day, .. } => Some(day),
            Boundary::Unbounded => None,
        });

    Ok(peak)
}

/// Check each allocation and build the sorted event list
fn sweep_events(allocations: &[CostSplitAllocation]) -> Result<Vec<SweepEvent>, ValidationError> {
    if allocations.is_empty() {
        return Err(ValidationError::EmptyAllocationSet);
    }

    let mut events = Vec::with_capacity(allocations.len() * 2);
    for (index, split) in allocations.iter().enumerate() {
        let window = check_allocation(index, split)?;
        events.push(SweepEvent { at: window.opening(), change: split.percentage });
        events.push(SweepEvent { at: window.closing(), change: -split.percentage });
    }

    events.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| b.change.total_cmp(&a.change)));
    Ok(events)
}

fn check_allocation(index: usize, split: &CostSplitAllocation) -> Result<EffectiveWindow, ValidationError> {
    let start = parse_date(&split.start_date).ok_or(ValidationError::InvalidDate {
        field: DateField::StartDate,
        index,
    })?;

    let end = match split.end_text() {
        Some(text) => Some(parse_date(text).ok_or(ValidationError::InvalidDate {
            field: DateField::EndDate,
            index,
        })?),
        None => None,
    };

    if matches!(end, Some(end) if end < start) {
        return Err(ValidationError::InvalidDateRange { index });
    }

    if !split.percentage.is_finite() || !(0.0..=MAX_PERCENTAGE).contains(&split.percentage) {
        return Err(ValidationError::InvalidPercentage { index });
    }

    Ok(EffectiveWindow { start, end })
}
