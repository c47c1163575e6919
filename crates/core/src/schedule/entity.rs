//! Schedulable entities and the adapter that normalizes source records.
//!
//! Persisted courses and OCR-recognized candidates arrive in different
//! shapes. [`SourceEntity`] names both explicitly, and
//! [`SourceEntity::into_scheduled`] turns either into a [`ScheduledEntity`]
//! with validated slots before any conflict check sees it.

use serde::{Deserialize, Serialize};

use super::conflict::ConflictRecord;
use super::slot::{ClockTime, WeeklySlot};
use super::weekday::parse_day_name;
use crate::error::CoreError;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// ScheduledEntity
// ---------------------------------------------------------------------------

/// Anything that owns weekly slots and can collide with other entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEntity {
    /// Absent for candidates that have not been created yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub label: String,
    #[serde(default)]
    pub slots: Vec<WeeklySlot>,
    #[serde(default)]
    pub conflicts: Vec<ConflictRecord>,
}

impl ScheduledEntity {
    pub fn new(id: Option<EntityId>, label: impl Into<String>, slots: Vec<WeeklySlot>) -> Self {
        Self {
            id,
            label: label.into(),
            slots,
            conflicts: Vec::new(),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Replace the conflict annotation.
    pub fn with_conflicts(mut self, conflicts: Vec<ConflictRecord>) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Validate every slot, failing on the first malformed one.
    pub fn validate_slots(&self) -> Result<(), CoreError> {
        self.slots.iter().try_for_each(WeeklySlot::validate)
    }
}

// ---------------------------------------------------------------------------
// Source records
// ---------------------------------------------------------------------------

/// A course as stored by the remote backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub slots: Vec<WeeklySlot>,
}

/// One session line as recognized from a timetable image. All fields are raw
/// text and untrusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrSession {
    pub day: String,
    pub start: String,
    pub end: String,
}

/// A course candidate produced by timetable recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrCandidateCourse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub sessions: Vec<OcrSession>,
    /// Recognition confidence in `[0.0, 1.0]`, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Either kind of record that can be normalized into a [`ScheduledEntity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceEntity {
    Course(Course),
    OcrCandidate(OcrCandidateCourse),
}

impl From<Course> for SourceEntity {
    fn from(value: Course) -> Self {
        SourceEntity::Course(value)
    }
}

impl From<OcrCandidateCourse> for SourceEntity {
    fn from(value: OcrCandidateCourse) -> Self {
        SourceEntity::OcrCandidate(value)
    }
}

impl SourceEntity {
    /// Normalize into a [`ScheduledEntity`] with validated slots.
    pub fn into_scheduled(self) -> Result<ScheduledEntity, CoreError> {
        match self {
            SourceEntity::Course(course) => {
                let label = display_label(Some(course.name.as_str()), course.code.as_deref())?;
                let entity = ScheduledEntity::new(Some(course.id), label, course.slots);
                entity.validate_slots()?;
                Ok(entity)
            }
            SourceEntity::OcrCandidate(candidate) => {
                let label =
                    display_label(candidate.name.as_deref(), candidate.code.as_deref())?;
                let slots = candidate
                    .sessions
                    .iter()
                    .map(session_to_slot)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ScheduledEntity::new(None, label, slots))
            }
        }
    }
}

/// `"CODE name"` when a code is present, otherwise the trimmed name.
fn display_label(name: Option<&str>, code: Option<&str>) -> Result<String, CoreError> {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CoreError::Validation("course name is required".to_string()))?;

    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Ok(format!("{code} {name}")),
        None => Ok(name.to_string()),
    }
}

fn session_to_slot(session: &OcrSession) -> Result<WeeklySlot, CoreError> {
    let day = parse_day_name(&session.day)?;
    let start: ClockTime = session.start.parse()?;
    let end: ClockTime = session.end.parse()?;
    WeeklySlot::new(day, start, end)
}
