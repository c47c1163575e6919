//! Submitting confirmed import candidates to the remote store.

use std::fmt::Display;

use async_trait::async_trait;
use serde::Serialize;

use studyplan_core::schedule::{Course, ScheduledEntity};
use studyplan_sync::{ClassifyError, MutationCoordinator, MutationOptions, MutationOutcome};

use crate::report::ReportEntry;

/// Remote operation that creates a course from a confirmed candidate.
#[async_trait]
pub trait CourseStore: Send + Sync {
    type Error: ClassifyError + Display + Send;

    /// Create the course and return the stored record.
    async fn create_course(&self, entity: &ScheduledEntity) -> Result<Course, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedSubmission {
    pub index: usize,
    pub label: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSummary {
    pub created: Vec<Course>,
    pub failed: Vec<FailedSubmission>,
    /// Input indices whose submission was already in flight.
    pub skipped: Vec<usize>,
}

/// Coordinator key for a candidate that has no id yet.
pub fn candidate_key(index: usize) -> String {
    format!("import:{index}")
}

/// Submit each entry individually through the coordinator.
///
/// A failure on one entry does not stop the others.
pub async fn submit_confirmed<S: CourseStore>(
    coordinator: &MutationCoordinator,
    store: &S,
    entries: &[&ReportEntry],
) -> SubmitSummary {
    let mut summary = SubmitSummary::default();

    for entry in entries {
        let key = candidate_key(entry.index);
        let entity = &entry.entity;
        let options = MutationOptions::labeled(entity.label.clone()).with_action("create");
        let result = coordinator
            .mutate(&key, move || store.create_course(entity), options)
            .await;

        match result {
            Ok(MutationOutcome::Completed(course)) => summary.created.push(course),
            Ok(MutationOutcome::Skipped) => summary.skipped.push(entry.index),
            Err(err) => summary.failed.push(FailedSubmission {
                index: entry.index,
                label: entry.entity.label.clone(),
                message: err.message().to_string(),
            }),
        }
    }

    tracing::info!(
        created = summary.created.len(),
        failed = summary.failed.len(),
        skipped = summary.skipped.len(),
        "Submitted confirmed candidates"
    );
    summary
}
