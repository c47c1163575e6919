//! Batch conflict partitioning for imported candidates.
//!
//! Every candidate is checked against the existing entities and against every
//! other candidate in the batch, then placed in either the clean or the
//! conflicting group. Conflicting candidates are never dropped; they are only
//! left out of the default selection and must be force-included explicitly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::conflict::scan;
use super::entity::ScheduledEntity;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// BatchPartition
// ---------------------------------------------------------------------------

/// Result of [`partition`]. Both groups keep the relative input order, and
/// each entity carries its populated `conflicts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPartition {
    pub clean: Vec<ScheduledEntity>,
    pub conflicting: Vec<ScheduledEntity>,
    /// Input index of each entry in `clean`.
    pub clean_indices: Vec<usize>,
    /// Input index of each entry in `conflicting`.
    pub conflicting_indices: Vec<usize>,
}

impl BatchPartition {
    pub fn total(&self) -> usize {
        self.clean.len() + self.conflicting.len()
    }

    /// Input indices selected by default: exactly the clean ones.
    pub fn default_selection(&self) -> Vec<usize> {
        self.clean_indices.clone()
    }

    /// Look up an annotated entity by its input index.
    pub fn entity(&self, index: usize) -> Option<&ScheduledEntity> {
        if let Some(pos) = self.clean_indices.iter().position(|&i| i == index) {
            return self.clean.get(pos);
        }
        self.conflicting_indices
            .iter()
            .position(|&i| i == index)
            .and_then(|pos| self.conflicting.get(pos))
    }

    pub fn is_conflicting(&self, index: usize) -> bool {
        self.conflicting_indices.contains(&index)
    }
}

/// Partition a candidate batch into clean and conflicting groups.
///
/// Candidates have no identity yet, so cross-candidate checks exclude only
/// the candidate itself (by position); two candidates that collide with each
/// other are both flagged. Fails on the first candidate with a malformed slot.
pub fn partition(
    candidates: Vec<ScheduledEntity>,
    existing: &[ScheduledEntity],
) -> Result<BatchPartition, CoreError> {
    let mut annotated = Vec::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        let others = candidates
            .iter()
            .enumerate()
            .filter(|(other_index, _)| *other_index != index)
            .map(|(_, other)| other);
        let conflicts = scan(&candidate.slots, existing.iter().chain(others), None)?;
        annotated.push(conflicts);
    }

    let mut result = BatchPartition {
        clean: Vec::new(),
        conflicting: Vec::new(),
        clean_indices: Vec::new(),
        conflicting_indices: Vec::new(),
    };
    for (index, (candidate, conflicts)) in candidates.into_iter().zip(annotated).enumerate() {
        let entity = candidate.with_conflicts(conflicts);
        if entity.has_conflicts() {
            result.conflicting.push(entity);
            result.conflicting_indices.push(index);
        } else {
            result.clean.push(entity);
            result.clean_indices.push(index);
        }
    }

    Ok(result)
}

// ---------------------------------------------------------------------------
// ImportSelection
// ---------------------------------------------------------------------------

/// The user's confirmation choices over a partitioned batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSelection {
    total: usize,
    selected: BTreeSet<usize>,
}

impl ImportSelection {
    /// Start from the default selection (all clean candidates).
    pub fn new(partition: &BatchPartition) -> Self {
        Self {
            total: partition.total(),
            selected: partition.default_selection().into_iter().collect(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), CoreError> {
        if index >= self.total {
            return Err(CoreError::Validation(format!(
                "candidate index {index} out of range (batch has {} items)",
                self.total
            )));
        }
        Ok(())
    }

    /// Flip selection of one candidate. Returns the new state.
    pub fn toggle(&mut self, index: usize) -> Result<bool, CoreError> {
        self.check_index(index)?;
        if self.selected.remove(&index) {
            Ok(false)
        } else {
            self.selected.insert(index);
            Ok(true)
        }
    }

    /// Select a candidate even if it has conflicts.
    pub fn force_include(&mut self, index: usize) -> Result<(), CoreError> {
        self.check_index(index)?;
        self.selected.insert(index);
        Ok(())
    }

    pub fn exclude(&mut self, index: usize) -> Result<(), CoreError> {
        self.check_index(index)?;
        self.selected.remove(&index);
        Ok(())
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected input indices in ascending order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Selected entities in input order.
    pub fn confirmed<'a>(&self, partition: &'a BatchPartition) -> Vec<&'a ScheduledEntity> {
        self.selected
            .iter()
            .filter_map(|&index| partition.entity(index))
            .collect()
    }
}
