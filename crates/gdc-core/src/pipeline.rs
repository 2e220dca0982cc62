//! End-to-end cleaning of a loaded event store.

use crate::ai_help::AiHelpIndex;
use crate::identity::{IdentityConflict, IdentityMap};
use crate::record::{CleanedRecord, IdentityMode, Lookups, SkipCounts, build_records};
use crate::store::EventStore;
use crate::summary::{StudentSummary, summarize};
use crate::table::sort_for_export;

/// Options for one cleaning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOptions {
    pub mode: IdentityMode,
    /// Only the first N events of the document produce records.
    pub sample_size: Option<usize>,
}

/// Result of a cleaning run.
#[derive(Debug, Clone, Default)]
pub struct CleanedData {
    /// Records in export order.
    pub records: Vec<CleanedRecord>,
    pub summaries: Vec<StudentSummary>,
    pub skipped: SkipCounts,
    pub conflicts: Vec<IdentityConflict>,
    /// Events the record pass looked at, after sampling.
    pub events_considered: usize,
}

/// Runs the cleaning pipeline.
///
/// The identity map and AI help index always cover the whole document;
/// sampling only limits which events are turned into records.
pub fn clean(store: &EventStore, options: CleanOptions) -> CleanedData {
    let identity = IdentityMap::build(store.events());
    for (session_id, student_id) in identity.sample(5) {
        tracing::debug!(%session_id, %student_id, "sample session mapping");
    }
    let ai_help = AiHelpIndex::build(store.events());

    let sorted = store.time_sorted(options.sample_size);
    let set = build_records(
        &sorted,
        Lookups {
            identity: &identity,
            ai_help: &ai_help,
        },
        options.mode,
    );

    let mut records = set.records;
    sort_for_export(&mut records);
    let summaries = summarize(&records);

    CleanedData {
        records,
        summaries,
        skipped: set.skipped,
        conflicts: identity.conflicts().to_vec(),
        events_considered: sorted.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::condition::Condition;
    use crate::table::{render_records, render_summaries};

    fn store() -> EventStore {
        let events = json!([
            {"type": "session_start", "sessionId": "s1", "studentId": "alice", "timeElapsedSeconds": 0},
            {"type": "task_attempt", "sessionId": "s1", "taskId": "g1t5", "timeElapsedSeconds": 95,
             "section": "02A-Checkpoint", "currentSemester": 1, "userAnswer": "37", "correctAnswer": "37",
             "pointsEarned": 5, "timestamp": "2025-03-01T10:01:35Z"},
            {"type": "ai_task_help", "sessionId": "s1", "taskId": "g1t5", "timeElapsedSeconds": 100,
             "0": "3", "1": "7"},
            {"type": "task_attempt", "sessionId": "s1", "taskId": "g2t12", "timeElapsedSeconds": 155,
             "section": "02A-Checkpoint", "currentSemester": 1, "pointsEarned": "bad",
             "timestamp": "2025-03-01T10:02:35Z"},
            {"type": "page_switch", "sessionId": "s1", "timeElapsedSeconds": 215},
            {"type": "task_attempt", "sessionId": "anon", "taskId": "g3t30", "timeElapsedSeconds": 20,
             "hasAI": false, "hasCheckpoint": true, "timestamp": "2025-03-01T11:00:20Z"},
            {"type": "task_attempt", "sessionId": "s1", "studentId": "mallory", "taskId": "g3t1",
             "timeElapsedSeconds": 500, "section": "02A-Checkpoint", "currentSemester": 2,
             "timestamp": "2025-03-01T10:08:20Z"}
        ]);
        EventStore::from_json_str(&events.to_string()).unwrap()
    }

    #[test]
    fn strict_run_links_help_and_time() {
        let data = clean(&store(), CleanOptions::default());

        assert_eq!(data.records.len(), 3);
        assert!(data.records.iter().all(|r| r.student_id == "alice"));
        assert_eq!(data.skipped.unresolved_student, 1);
        assert_eq!(data.conflicts.len(), 1);
        assert_eq!(data.events_considered, 7);

        let first = &data.records[0];
        assert_eq!(first.task_id, "g1t5");
        assert_eq!(first.ai_response, "37");
        assert_eq!(first.time_spent_seconds, Some(60.0));
        assert_eq!(data.records[1].time_spent_seconds, Some(60.0));
        assert_eq!(data.records[2].time_spent_seconds, None);

        assert_eq!(data.summaries.len(), 1);
        let summary = &data.summaries[0];
        assert_eq!(summary.condition, Condition::AiCheckpoint);
        assert_eq!(summary.total_tasks_attempted, 3);
        assert_eq!(summary.ai_help_count, 1);
        assert_eq!(summary.max_semester_reached, 2);
        assert_eq!(summary.task_types_attempted, 3);
    }

    #[test]
    fn permissive_run_keeps_unlinked_sessions() {
        let options = CleanOptions {
            mode: IdentityMode::Permissive,
            sample_size: None,
        };
        let data = clean(&store(), options);

        assert_eq!(data.records.len(), 4);
        let anon = data.records.last().unwrap();
        assert_eq!(anon.student_id, "session_anon");
        assert_eq!(anon.condition, Condition::NoAiCheckpoint);
        assert!(anon.is_practice_mode);
        assert_eq!(data.summaries.len(), 2);
    }

    #[test]
    fn sampling_limits_records_but_not_lookups() {
        let options = CleanOptions {
            mode: IdentityMode::Strict,
            sample_size: Some(2),
        };
        let data = clean(&store(), options);

        assert_eq!(data.events_considered, 2);
        assert_eq!(data.records.len(), 1);
        let record = &data.records[0];
        assert_eq!(record.ai_response, "37");
        assert_eq!(record.time_spent_seconds, None);
    }

    #[test]
    fn repeated_runs_render_identically() {
        let store = store();
        let first = clean(&store, CleanOptions::default());
        let second = clean(&store, CleanOptions::default());

        assert_eq!(render_records(&first.records), render_records(&second.records));
        assert_eq!(
            render_summaries(&first.summaries),
            render_summaries(&second.summaries)
        );
    }
}
