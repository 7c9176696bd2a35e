//! Set reconciliation between desired and existing value collections.
//!
//! One deterministic diff serves every list-valued sub-attribute (load
//! balancer associations, allow-listed principals). Inputs are treated as
//! sets: unordered and duplicate-insensitive. Outputs are sorted so
//! request construction is reproducible.

use std::collections::BTreeSet;

/// Changes needed to converge an existing set onto a desired set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetDiff {
    /// Values present in desired but not existing, sorted.
    pub to_add: Vec<String>,
    /// Values present in existing but not desired, sorted.
    pub to_remove: Vec<String>,
}

impl SetDiff {
    /// Returns true if the sets already coincide.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Computes `to_add = desired − existing` and `to_remove = existing − desired`.
#[must_use]
pub fn string_set_diff(desired: &[String], existing: &[String]) -> SetDiff {
    let desired: BTreeSet<&String> = desired.iter().collect();
    let existing: BTreeSet<&String> = existing.iter().collect();

    SetDiff {
        to_add: desired
            .difference(&existing)
            .map(|value| (*value).clone())
            .collect(),
        to_remove: existing
            .difference(&desired)
            .map(|value| (*value).clone())
            .collect(),
    }
}
