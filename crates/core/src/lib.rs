//! Pure domain logic for the study planner.
//!
//! This crate has zero internal dependencies and performs no I/O or async
//! work. It holds the shared data model plus the schedule conflict math used
//! both for single manual edits and for batch import of recognized timetables:
//!
//! - [`schedule::slot`]: `WeeklySlot`, `ClockTime`, and the overlap test.
//! - [`schedule::conflict`]: scanning one slot set against existing entities.
//! - [`schedule::partition`]: splitting a candidate batch into clean and
//!   conflicting groups, plus the confirmation selection.
//! - [`schedule::entity`]: the course / OCR candidate adapter.
//! - [`schedule::weekday`]: day-of-week convention adapter.

pub mod error;
pub mod mutation;
pub mod preferences;
pub mod schedule;
pub mod types;
