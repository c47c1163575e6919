//! Timetable import pipeline.
//!
//! Takes the existing courses plus the candidates produced by timetable
//! recognition, normalizes and validates the candidates, partitions them
//! into clean and conflicting groups, and submits the confirmed ones through
//! the mutation coordinator.

pub mod report;
pub mod submit;

pub use report::{
    build_report, ImportDocument, ImportError, ImportReport, RejectedCandidate, ReportEntry,
};
pub use submit::{candidate_key, submit_confirmed, CourseStore, FailedSubmission, SubmitSummary};
