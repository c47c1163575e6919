//! Weekly schedule model and conflict detection.
//!
//! Provides slot types, the overlap test, single-entity scanning, and batch
//! partitioning. All functions are pure; nothing here touches shared state.

pub mod conflict;
pub mod entity;
pub mod partition;
pub mod slot;
pub mod weekday;

pub use conflict::{check_schedule_edit, conflict_summary, scan, ConflictRecord};
pub use entity::{Course, OcrCandidateCourse, OcrSession, ScheduledEntity, SourceEntity};
pub use partition::{partition, BatchPartition, ImportSelection};
pub use slot::{overlaps, ClockTime, WeeklySlot};
