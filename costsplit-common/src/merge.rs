//! Building candidate allocation sets from edits
//!
//! Nothing here touches storage. Each function takes the employee's current
//! allocations and the user's edit and returns what the new set would be,
//! checked by the validator, so the caller can persist it in one transaction.

use std::collections::HashSet;

use tracing::debug;

use crate::allocation::CostSplitAllocation;
use crate::validator::{validate_with, ValidationPolicy};
use crate::{Error, Result};

/// Changes needed to turn the stored set into the submitted set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertPlan {
    /// Submitted allocations that overwrite a stored allocation with the same id
    pub updates: Vec<CostSplitAllocation>,
    /// Submitted allocations without an id
    pub creates: Vec<CostSplitAllocation>,
    /// Ids of stored allocations missing from the submission
    pub deletes: Vec<String>,
}

impl UpsertPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty() && self.deletes.is_empty()
    }
}

/// Candidate set after adding or editing one allocation.
///
/// Drops any existing allocation sharing `incoming`'s id, keeps the rest in
/// order, and appends `incoming`. An `incoming` without an id replaces
/// nothing.
///
/// # Examples
///
/// ```
/// use costsplit_common::merge::merge_allocation;
/// use costsplit_common::CostSplitAllocation;
///
/// let existing = vec![
///     CostSplitAllocation::new("A", 60.0, "2024-01-01").with_id("s1"),
///     CostSplitAllocation::new("B", 40.0, "2024-01-01").with_id("s2"),
/// ];
/// let edited = CostSplitAllocation::new("B", 30.0, "2024-01-01").with_id("s2");
///
/// let merged = merge_allocation(&existing, &edited);
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[1].percentage, 30.0);
/// ```
pub fn merge_allocation(
    existing: &[CostSplitAllocation],
    incoming: &CostSplitAllocation,
) -> Vec<CostSplitAllocation> {
    let mut merged: Vec<CostSplitAllocation> = existing
        .iter()
        .filter(|split| incoming.id.is_none() || split.id != incoming.id)
        .cloned()
        .collect();
    merged.push(incoming.clone());
    merged
}

/// Candidate set after editing the stored allocation `split_id`.
///
/// The edited allocation takes `split_id` as its id whatever the submission
/// carried. The result has already passed validation under `policy`.
pub fn replace_allocation(
    existing: &[CostSplitAllocation],
    split_id: &str,
    incoming: &CostSplitAllocation,
    policy: &ValidationPolicy,
) -> Result<Vec<CostSplitAllocation>> {
    if !existing.iter().any(|split| split.id.as_deref() == Some(split_id)) {
        return Err(Error::NotFound(format!("Cost split not found: {}", split_id)));
    }

    let edited = incoming.clone().with_id(split_id);
    let candidate = merge_allocation(existing, &edited);
    validate_with(&candidate, policy)?;

    debug!("Cost split {} edit accepted ({} in set)", split_id, candidate.len());
    Ok(candidate)
}

/// Plan a bulk replacement of the stored set with `submitted`.
///
/// `submitted` is validated under `policy` as the complete new set. Every id
/// it carries must exist in `existing`.
pub fn plan_upsert(
    existing: &[CostSplitAllocation],
    submitted: &[CostSplitAllocation],
    policy: &ValidationPolicy,
) -> Result<UpsertPlan> {
    validate_with(submitted, policy)?;

    let stored_ids: HashSet<&str> = existing.iter().filter_map(|s| s.id.as_deref()).collect();
    let submitted_ids: HashSet<&str> = submitted.iter().filter_map(|s| s.id.as_deref()).collect();

    let mut plan = UpsertPlan::default();
    for split in submitted {
        match split.id.as_deref() {
            Some(id) if stored_ids.contains(id) => plan.updates.push(split.clone()),
            Some(id) => return Err(Error::NotFound(format!("Cost split not found: {}", id))),
            None => plan.creates.push(split.clone()),
        }
    }

    plan.deletes = existing
        .iter()
        .filter_map(|s| s.id.as_deref())
        .filter(|id| !submitted_ids.contains(id))
        .map(str::to_string)
        .collect();

    debug!(
        "Cost split upsert: {} updates, {} creates, {} deletes",
        plan.updates.len(),
        plan.creates.len(),
        plan.deletes.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;

    fn stored() -> Vec<CostSplitAllocation> {
        vec![
            CostSplitAllocation::new("A", 60.0, "2024-01-01").with_id("s1"),
            CostSplitAllocation::new("B", 40.0, "2024-01-01").with_id("s2"),
        ]
    }

    #[test]
    fn test_merge_appends_new_allocation() {
        let existing = stored();
        let incoming = CostSplitAllocation::new("C", 10.0, "2025-01-01");
        let merged = merge_allocation(&existing, &incoming);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[..2], existing[..]);
        assert_eq!(merged[2], incoming);
    }

    #[test]
    fn test_merge_replaces_same_id_and_moves_it_last() {
        let existing = stored();
        let incoming = CostSplitAllocation::new("A", 50.0, "2024-01-01").with_id("s1");
        let merged = merge_allocation(&existing, &incoming);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id.as_deref(), Some("s2"));
        assert_eq!(merged[1], incoming);
        // Input untouched
        assert_eq!(existing[0].percentage, 60.0);
    }

    #[test]
    fn test_merge_with_unknown_id_appends() {
        let merged = merge_allocation(&stored(), &CostSplitAllocation::new("D", 5.0, "2024-01-01").with_id("s9"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_new_allocation_keeps_existing_without_ids() {
        let existing = vec![CostSplitAllocation::new("A", 20.0, "2024-01-01")];
        let merged = merge_allocation(&existing, &CostSplitAllocation::new("B", 20.0, "2024-01-01"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_replace_accepts_valid_edit() {
        let edit = CostSplitAllocation::new("B", 30.0, "2024-01-01");
        let candidate = replace_allocation(&stored(), "s2", &edit, &ValidationPolicy::default()).unwrap();

        assert_eq!(candidate.len(), 2);
        assert_eq!(candidate[1].id.as_deref(), Some("s2"));
        assert_eq!(candidate[1].percentage, 30.0);
    }

    #[test]
    fn test_replace_rejects_overlap() {
        let edit = CostSplitAllocation::new("B", 45.0, "2024-01-01");
        let err = replace_allocation(&stored(), "s2", &edit, &ValidationPolicy::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::OverlapExceeds100)));
    }

    #[test]
    fn test_replace_honours_configured_limit() {
        let strict = ValidationPolicy { max_total_percentage: 80.0, epsilon: 0.0 };
        let edit = CostSplitAllocation::new("B", 30.0, "2024-01-01");
        assert!(replace_allocation(&stored(), "s2", &edit, &ValidationPolicy::default()).is_ok());

        let err = replace_allocation(&stored(), "s2", &edit, &strict).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::OverlapExceeds100)));

        let edit = CostSplitAllocation::new("B", 20.0, "2024-01-01");
        assert!(replace_allocation(&stored(), "s2", &edit, &strict).is_ok());
    }

    #[test]
    fn test_replace_unknown_id() {
        let edit = CostSplitAllocation::new("B", 10.0, "2024-01-01");
        let err = replace_allocation(&stored(), "missing", &edit, &ValidationPolicy::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_plan_upsert_classifies_changes() {
        let submitted = vec![
            CostSplitAllocation::new("A", 70.0, "2024-01-01").with_id("s1"),
            CostSplitAllocation::new("C", 30.0, "2024-01-01"),
        ];
        let plan = plan_upsert(&stored(), &submitted, &ValidationPolicy::default()).unwrap();

        assert_eq!(plan.updates, vec![submitted[0].clone()]);
        assert_eq!(plan.creates, vec![submitted[1].clone()]);
        assert_eq!(plan.deletes, vec!["s2".to_string()]);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_plan_upsert_unchanged_set() {
        let plan = plan_upsert(&stored(), &stored(), &ValidationPolicy::default()).unwrap();
        assert_eq!(plan.updates.len(), 2);
        assert!(plan.creates.is_empty());
        assert!(plan.deletes.is_empty());
    }

    #[test]
    fn test_plan_upsert_rejects_invalid_set() {
        let submitted = vec![
            CostSplitAllocation::new("A", 70.0, "2024-01-01").with_id("s1"),
            CostSplitAllocation::new("C", 40.0, "2024-01-01"),
        ];
        let err = plan_upsert(&stored(), &submitted, &ValidationPolicy::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::OverlapExceeds100)));

        let err = plan_upsert(&stored(), &[], &ValidationPolicy::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyAllocationSet)));
    }

    #[test]
    fn test_plan_upsert_honours_configured_limit() {
        let strict = ValidationPolicy { max_total_percentage: 80.0, epsilon: 0.0 };
        assert!(plan_upsert(&stored(), &stored(), &ValidationPolicy::default()).is_ok());

        let err = plan_upsert(&stored(), &stored(), &strict).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::OverlapExceeds100)));

        let relaxed = ValidationPolicy { max_total_percentage: 120.0, epsilon: 0.0 };
        let submitted = vec![
            CostSplitAllocation::new("A", 70.0, "2024-01-01").with_id("s1"),
            CostSplitAllocation::new("C", 40.0, "2024-01-01"),
        ];
        let plan = plan_upsert(&stored(), &submitted, &relaxed).unwrap();
        assert_eq!(plan.creates.len(), 1);
    }

    #[test]
    fn test_plan_upsert_unknown_id() {
        let submitted = vec![CostSplitAllocation::new("A", 50.0, "2024-01-01").with_id("ghost")];
        let err = plan_upsert(&stored(), &submitted, &ValidationPolicy::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
