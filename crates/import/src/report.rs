//! Import report: normalization, partitioning, and default selection.

use serde::{Deserialize, Serialize};

use studyplan_core::error::CoreError;
use studyplan_core::schedule::{
    conflict_summary, partition, Course, ImportSelection, OcrCandidateCourse, ScheduledEntity,
    SourceEntity,
};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The document read by the import command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    #[serde(default)]
    pub existing: Vec<Course>,
    #[serde(default)]
    pub candidates: Vec<OcrCandidateCourse>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A candidate that passed validation, with its conflicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    /// Position in the input `candidates` array.
    pub index: usize,
    pub entity: ScheduledEntity,
    pub summaries: Vec<String>,
}

/// A candidate that failed normalization and was left out of the partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedCandidate {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total_candidates: usize,
    pub clean: Vec<ReportEntry>,
    pub conflicting: Vec<ReportEntry>,
    pub rejected: Vec<RejectedCandidate>,
    /// Input indices that will be submitted, ascending.
    pub selected: Vec<usize>,
}

impl ImportReport {
    /// Selected entities in input order.
    pub fn selected_entries(&self) -> Vec<&ReportEntry> {
        let mut entries: Vec<&ReportEntry> = self
            .clean
            .iter()
            .chain(&self.conflicting)
            .filter(|entry| self.selected.contains(&entry.index))
            .collect();
        entries.sort_by_key(|entry| entry.index);
        entries
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Existing course '{id}' is invalid: {source}")]
    InvalidExisting { id: String, source: CoreError },

    #[error("Candidate {index} cannot be selected: {reason}")]
    UnselectableCandidate { index: usize, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Normalize, partition, and select.
///
/// Candidates that fail normalization are reported as rejected and take no
/// part in conflict checks. `force_include` lists input indices of
/// conflicting candidates the user chose to keep; naming a rejected or
/// out-of-range candidate is an error.
pub fn build_report(
    document: ImportDocument,
    force_include: &[usize],
) -> Result<ImportReport, ImportError> {
    let existing = document
        .existing
        .into_iter()
        .map(|course| {
            let id = course.id.clone();
            SourceEntity::from(course)
                .into_scheduled()
                .map_err(|source| ImportError::InvalidExisting { id, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total_candidates = document.candidates.len();
    let mut accepted = Vec::new();
    let mut accepted_indices = Vec::new();
    let mut rejected = Vec::new();
    for (index, candidate) in document.candidates.into_iter().enumerate() {
        match SourceEntity::from(candidate).into_scheduled() {
            Ok(entity) => {
                accepted.push(entity);
                accepted_indices.push(index);
            }
            Err(err) => {
                tracing::debug!(index, error = %err, "Rejected import candidate");
                rejected.push(RejectedCandidate {
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }

    let batch = partition(accepted, &existing)?;
    let mut selection = ImportSelection::new(&batch);

    for &index in force_include {
        let position = accepted_indices
            .iter()
            .position(|&i| i == index)
            .ok_or_else(|| ImportError::UnselectableCandidate {
                index,
                reason: if index < total_candidates {
                    "candidate was rejected".to_string()
                } else {
                    format!("batch has {total_candidates} candidates")
                },
            })?;
        selection.force_include(position)?;
    }

    let to_entries = |entities: Vec<ScheduledEntity>, positions: &[usize]| -> Vec<ReportEntry> {
        entities
            .into_iter()
            .zip(positions)
            .map(|(entity, &position)| ReportEntry {
                index: accepted_indices[position],
                summaries: entity.conflicts.iter().map(conflict_summary).collect(),
                entity,
            })
            .collect()
    };

    let selected = selection
        .selected_indices()
        .into_iter()
        .map(|position| accepted_indices[position])
        .collect();
    let clean = to_entries(batch.clean, &batch.clean_indices);
    let conflicting = to_entries(batch.conflicting, &batch.conflicting_indices);

    tracing::info!(
        total_candidates,
        clean = clean.len(),
        conflicting = conflicting.len(),
        rejected = rejected.len(),
        "Built import report"
    );

    Ok(ImportReport {
        total_candidates,
        clean,
        conflicting,
        rejected,
        selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use studyplan_core::schedule::{OcrSession, WeeklySlot};

    fn course(id: &str, name: &str, slots: Vec<WeeklySlot>) -> Course {
        Course {
            id: id.into(),
            name: name.into(),
            code: None,
            location: None,
            slots,
        }
    }

    fn candidate(name: &str, day: &str, start: &str, end: &str) -> OcrCandidateCourse {
        OcrCandidateCourse {
            name: Some(name.into()),
            code: None,
            location: None,
            sessions: vec![OcrSession {
                day: day.into(),
                start: start.into(),
                end: end.into(),
            }],
            confidence: None,
        }
    }

    fn document() -> ImportDocument {
        ImportDocument {
            existing: vec![course(
                "calc",
                "Calculus",
                vec![WeeklySlot::parse(0, "10:00", "11:00").unwrap()],
            )],
            candidates: vec![
                candidate("Biology", "Tue", "9:00", "10:00"),
                candidate("Broken", "Wed", "11:00", "10:00"),
                candidate("Physics", "Mon", "9:30", "10:30"),
                candidate("Art", "Thu", "13:00", "14:00"),
            ],
        }
    }

    #[test]
    fn report_uses_original_indices() {
        let report = build_report(document(), &[]).unwrap();

        assert_eq!(report.total_candidates, 4);
        let clean: Vec<usize> = report.clean.iter().map(|e| e.index).collect();
        assert_eq!(clean, vec![0, 3]);
        assert_eq!(report.conflicting.len(), 1);
        assert_eq!(report.conflicting[0].index, 2);
        assert_eq!(
            report.conflicting[0].summaries,
            vec!["Mon 09:30-10:30 overlaps Calculus (Mon 10:00-11:00)".to_string()]
        );
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
        assert!(report.rejected[0].reason.contains("Invalid time range"));
        assert_eq!(report.selected, vec![0, 3]);
    }

    #[test]
    fn force_include_selects_conflicting_candidate() {
        let report = build_report(document(), &[2]).unwrap();
        assert_eq!(report.selected, vec![0, 2, 3]);

        let labels: Vec<&str> = report
            .selected_entries()
            .into_iter()
            .map(|e| e.entity.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Biology", "Physics", "Art"]);
    }

    #[test]
    fn force_including_rejected_candidate_fails() {
        assert_matches!(
            build_report(document(), &[1]),
            Err(ImportError::UnselectableCandidate { index: 1, .. })
        );
        assert_matches!(
            build_report(document(), &[9]),
            Err(ImportError::UnselectableCandidate { index: 9, .. })
        );
    }

    #[test]
    fn invalid_existing_course_fails_the_import() {
        let mut doc = document();
        doc.existing[0].name = String::new();
        let err = build_report(doc, &[]).unwrap_err();
        assert!(err.to_string().contains("calc"));
    }

    #[test]
    fn document_parses_from_json() {
        let doc: ImportDocument = serde_json::from_value(serde_json::json!({
            "existing": [{
                "id": "c1",
                "name": "Calculus",
                "slots": [{"dayOfWeek": 0, "startTime": "10:00", "endTime": "11:00"}]
            }],
            "candidates": [{
                "name": "Physics",
                "sessions": [{"day": "Mon", "start": "9:30", "end": "10:30"}],
                "confidence": 0.82
            }]
        }))
        .unwrap();
        let report = build_report(doc, &[]).unwrap();
        assert_eq!(report.conflicting.len(), 1);
        assert!(report.selected.is_empty());
    }
}
