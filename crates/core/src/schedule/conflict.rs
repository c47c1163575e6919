//! Scanning a candidate slot set against existing scheduled entities.

use serde::{Deserialize, Serialize};

use super::entity::ScheduledEntity;
use super::slot::{overlaps, WeeklySlot};
use crate::error::CoreError;

/// One overlapping pair of slots, computed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    /// The candidate's slot.
    pub slot: WeeklySlot,
    /// `None` when the other side is an uncreated candidate.
    pub conflicting_entity_id: Option<String>,
    pub conflicting_entity_label: String,
    pub conflicting_slot: WeeklySlot,
}

/// Find every (candidate slot, existing slot) pair that overlaps.
///
/// Entities whose id equals `self_id` are skipped so an entity being edited
/// never conflicts with its own stored record. All candidate slots are
/// validated first; on the first malformed slot the error is returned and no
/// existing entity is examined.
///
/// Results are ordered by candidate slot, then by existing-entity iteration
/// order, then by the existing entity's slot order.
pub fn scan<'a, I>(
    candidate_slots: &[WeeklySlot],
    existing: I,
    self_id: Option<&str>,
) -> Result<Vec<ConflictRecord>, CoreError>
where
    I: IntoIterator<Item = &'a ScheduledEntity>,
{
    candidate_slots.iter().try_for_each(WeeklySlot::validate)?;

    let others: Vec<&ScheduledEntity> = existing
        .into_iter()
        .filter(|entity| match (self_id, entity.id.as_deref()) {
            (Some(self_id), Some(id)) => self_id != id,
            _ => true,
        })
        .collect();

    let mut conflicts = Vec::new();
    for slot in candidate_slots {
        for entity in &others {
            for other_slot in entity.slots.iter().filter(|s| overlaps(slot, s)) {
                conflicts.push(ConflictRecord {
                    slot: slot.clone(),
                    conflicting_entity_id: entity.id.clone(),
                    conflicting_entity_label: entity.label.clone(),
                    conflicting_slot: other_slot.clone(),
                });
            }
        }
    }

    Ok(conflicts)
}

/// Check a single manual schedule edit against the stored entities.
///
/// The edited entity's own id is excluded. Returns the entity annotated with
/// its conflicts.
pub fn check_schedule_edit(
    entity: ScheduledEntity,
    existing: &[ScheduledEntity],
) -> Result<ScheduledEntity, CoreError> {
    let conflicts = scan(&entity.slots, existing, entity.id.as_deref())?;
    Ok(entity.with_conflicts(conflicts))
}

/// One-line description such as `"Mon 09:00-10:30 overlaps Calculus (Mon 10:00-11:00)"`.
pub fn conflict_summary(record: &ConflictRecord) -> String {
    format!(
        "{} overlaps {} ({})",
        record.slot, record.conflicting_entity_label, record.conflicting_slot
    )
}
