//! Active allocation summaries
//!
//! Produces the one-line cost coding shown on an employee's profile, e.g.
//! `PRJ-1 (60%) / OPS (40%)`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::allocation::CostSplitAllocation;

/// Allocations in effect on `on`, largest percentage first.
///
/// Allocations with unparseable dates are skipped. Equal percentages keep
/// their input order.
pub fn active_on(allocations: &[CostSplitAllocation], on: NaiveDate) -> Vec<&CostSplitAllocation> {
    let mut active: Vec<&CostSplitAllocation> = allocations
        .iter()
        .filter(|split| split.window().is_some_and(|window| window.contains(on)))
        .collect();
    active.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    active
}

/// Percentage text for display, rounded to four decimals.
///
/// Trailing zeros are dropped, so `100.0` prints as `100` and
/// `0.1 + 0.2` as `0.3`.
pub fn format_percentage(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" => "0".to_string(),
        _ => text.to_string(),
    }
}

/// Combined percentage in effect on `on`
pub fn total_on(allocations: &[CostSplitAllocation], on: NaiveDate) -> f64 {
    active_on(allocations, on).iter().map(|split| split.percentage).sum()
}

/// Summary line for `on`, or `None` when nothing is in effect.
///
/// `codes` maps cost code ids to their display codes; ids without an entry
/// are shown as-is.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use chrono::NaiveDate;
/// use costsplit_common::summary::summary_line;
/// use costsplit_common::CostSplitAllocation;
///
/// let splits = vec![
///     CostSplitAllocation::new("cc-2", 40.0, "2024-01-01"),
///     CostSplitAllocation::new("cc-1", 60.0, "2024-01-01"),
/// ];
/// let codes = BTreeMap::from([("cc-1".to_string(), "PRJ-1".to_string())]);
/// let on = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
///
/// assert_eq!(summary_line(&splits, on, &codes).as_deref(), Some("PRJ-1 (60%) / cc-2 (40%)"));
/// ```
pub fn summary_line(
    allocations: &[CostSplitAllocation],
    on: NaiveDate,
    codes: &BTreeMap<String, String>,
) -> Option<String> {
    let active = active_on(allocations, on);
    if active.is_empty() {
        return None;
    }

    let parts: Vec<String> = active
        .iter()
        .map(|split| {
            let code = codes
                .get(&split.cost_code_id)
                .map(String::as_str)
                .unwrap_or(split.cost_code_id.as_str());
            format!("{} ({}%)", code, format_percentage(split.percentage))
        })
        .collect();
    Some(parts.join(" / "))
}
