//! Cleaned per-attempt records.
//!
//! The record builder walks the time-sorted events once. Every task
//! submission that has a session, a resolvable student and a well-formed
//! task ID becomes a [`CleanedRecord`]; the rest are counted and skipped.

use std::fmt;

use rayon::prelude::*;
use serde_json::Value;

use crate::ai_help::AiHelpIndex;
use crate::condition::Condition;
use crate::event::{Event, EventKind, TaskFields};
use crate::field;
use crate::identity::IdentityMap;
use crate::task::{Difficulty, TaskType, parse_task_id};
use crate::timing::BoundaryIndex;

/// Prefix of the stand-in student ID used for unlinked sessions in
/// permissive mode.
pub const SYNTHETIC_STUDENT_PREFIX: &str = "session_";

/// How submissions from sessions without a known student are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityMode {
    /// Drop them.
    #[default]
    Strict,
    /// Keep them under a synthetic student ID derived from the session.
    Permissive,
}

/// Synthetic student ID for a session with no linked student.
pub fn synthetic_student_id(session_id: &str) -> String {
    format!("{SYNTHETIC_STUDENT_PREFIX}{session_id}")
}

/// One task submission, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub student_id: String,
    pub session_id: String,
    pub semester: Value,
    pub task_number: u64,
    pub task_type: TaskType,
    pub task_level: Difficulty,
    pub task_id: String,
    pub student_response: String,
    pub correct_response: String,
    pub ai_help_used: bool,
    pub ai_response: String,
    pub time_spent_seconds: Option<f64>,
    pub time_spent_minutes: Option<f64>,
    pub condition: Condition,
    pub points_received: Value,
    pub current_student_learning_goal: Value,
    pub is_practice_mode: bool,
    pub event_type: EventKind,
    pub timestamp: Value,
    pub time_elapsed_readable: Value,
    pub attempts: Value,
    pub accuracy: Value,
}

impl CleanedRecord {
    /// Numeric semester, 0 when missing or not a whole number.
    pub fn semester_number(&self) -> u64 {
        field::semester_number(&self.semester)
    }
}

/// Why a task submission produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    MissingSession,
    UnresolvedStudent,
    MissingTaskId,
    UnparseableTaskId,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingSession => "missing session ID",
            Self::UnresolvedStudent => "no student linked to session",
            Self::MissingTaskId => "missing task ID",
            Self::UnparseableTaskId => "unparseable task ID",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tally of skipped submissions by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub missing_session: usize,
    pub unresolved_student: usize,
    pub missing_task_id: usize,
    pub unparseable_task_id: usize,
}

impl SkipCounts {
    pub const fn add(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingSession => self.missing_session += 1,
            SkipReason::UnresolvedStudent => self.unresolved_student += 1,
            SkipReason::MissingTaskId => self.missing_task_id += 1,
            SkipReason::UnparseableTaskId => self.unparseable_task_id += 1,
        }
    }

    pub const fn total(&self) -> usize {
        self.missing_session + self.unresolved_student + self.missing_task_id + self.unparseable_task_id
    }
}

/// Records in time-sorted order, plus what was skipped.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<CleanedRecord>,
    pub skipped: SkipCounts,
}

/// Lookup structures shared by every record, built before the pass.
#[derive(Debug, Clone, Copy)]
pub struct Lookups<'l, 'a> {
    pub identity: &'l IdentityMap,
    pub ai_help: &'l AiHelpIndex<'a>,
}

/// Builds cleaned records from `sorted`, the time-sorted event sequence.
///
/// Submissions are independent once the lookups exist, so they are
/// transformed in parallel; the output keeps the sequential order.
pub fn build_records(sorted: &[&Event], lookups: Lookups<'_, '_>, mode: IdentityMode) -> RecordSet {
    let boundaries = BoundaryIndex::build(sorted);

    let outcomes: Vec<Result<CleanedRecord, SkipReason>> = sorted
        .par_iter()
        .enumerate()
        .filter(|(_, event)| event.kind.is_task())
        .map(|(position, event)| build_record(position, event, &boundaries, lookups, mode))
        .collect();

    let mut set = RecordSet::default();
    for outcome in outcomes {
        match outcome {
            Ok(record) => set.records.push(record),
            Err(reason) => set.skipped.add(reason),
        }
    }

    tracing::debug!(
        records = set.records.len(),
        skipped = set.skipped.total(),
        missing_session = set.skipped.missing_session,
        unresolved_student = set.skipped.unresolved_student,
        missing_task_id = set.skipped.missing_task_id,
        unparseable_task_id = set.skipped.unparseable_task_id,
        "built cleaned records"
    );
    set
}

fn build_record(
    position: usize,
    event: &Event,
    boundaries: &BoundaryIndex<'_>,
    lookups: Lookups<'_, '_>,
    mode: IdentityMode,
) -> Result<CleanedRecord, SkipReason> {
    let session_id = event
        .session_id
        .as_deref()
        .ok_or(SkipReason::MissingSession)?;

    let student_id = match (lookups.identity.resolve(session_id), mode) {
        (Some(student), _) => student.to_string(),
        (None, IdentityMode::Permissive) => synthetic_student_id(session_id),
        (None, IdentityMode::Strict) => return Err(SkipReason::UnresolvedStudent),
    };

    let task_id = event.task_id.as_deref().ok_or(SkipReason::MissingTaskId)?;
    let task = parse_task_id(task_id).ok_or(SkipReason::UnparseableTaskId)?;

    let time_spent_seconds = boundaries.time_on_task(position, event);
    let ai_help = lookups
        .ai_help
        .query(session_id, task_id, event.elapsed_seconds.unwrap_or(0.0));
    let fields: TaskFields = event.task_fields().cloned().unwrap_or_default();

    Ok(CleanedRecord {
        student_id,
        session_id: session_id.to_string(),
        is_practice_mode: field::is_blank(&fields.semester),
        semester: fields.semester,
        task_number: task.number,
        task_type: task.task_type,
        task_level: task.difficulty,
        task_id: task_id.to_string(),
        student_response: field::cell(&fields.user_answer),
        correct_response: field::cell(&fields.correct_answer),
        ai_help_used: ai_help.used,
        ai_response: ai_help.response.unwrap_or_default(),
        time_spent_seconds,
        time_spent_minutes: time_spent_seconds.map(|seconds| seconds / 60.0),
        condition: event.condition.classify(),
        points_received: fields.points,
        current_student_learning_goal: fields.student_learning,
        event_type: event.kind,
        timestamp: fields.timestamp,
        time_elapsed_readable: fields.readable_time,
        attempts: fields.attempts,
        accuracy: fields.accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn run(events: &[Event], mode: IdentityMode) -> RecordSet {
        let identity = IdentityMap::build(events);
        let ai_help = AiHelpIndex::build(events);
        let sorted: Vec<&Event> = events.iter().collect();
        build_records(
            &sorted,
            Lookups {
                identity: &identity,
                ai_help: &ai_help,
            },
            mode,
        )
    }

    #[test]
    fn builds_full_record() {
        let events = [
            Event::from_json(json!({
                "type": "task_attempt",
                "sessionId": "s1",
                "studentId": "u1",
                "taskId": "g1t5",
                "timeElapsedSeconds": 95,
                "currentSemester": 1,
                "section": "02A-Checkpoint",
                "userAnswer": 37,
                "correctAnswer": "37",
                "pointsEarned": 5,
                "studentLearning": 12.5,
                "timestamp": "2025-03-01T10:00:00Z",
                "readableTime": "1:35",
                "attempts": 2,
                "accuracy": 0.9,
            })),
            Event::from_json(json!({
                "type": "ai_task_help",
                "sessionId": "s1",
                "taskId": "g1t5",
                "timeElapsedSeconds": 100,
                "0": "3",
                "1": "7",
            })),
            Event::from_json(json!({
                "type": "page_switch",
                "sessionId": "s1",
                "timeElapsedSeconds": 125,
            })),
        ];

        let set = run(&events, IdentityMode::Strict);
        assert_eq!(set.records.len(), 1);
        assert_eq!(set.skipped, SkipCounts::default());

        let record = &set.records[0];
        assert_eq!(record.student_id, "u1");
        assert_eq!(record.session_id, "s1");
        assert_eq!(record.task_type, TaskType::Counting);
        assert_eq!(record.task_level, Difficulty::Easy);
        assert_eq!(record.task_number, 5);
        assert_eq!(record.student_response, "37");
        assert_eq!(record.correct_response, "37");
        assert!(record.ai_help_used);
        assert_eq!(record.ai_response, "37");
        assert_eq!(record.time_spent_seconds, Some(30.0));
        assert_eq!(record.time_spent_minutes, Some(0.5));
        assert_eq!(record.condition, Condition::AiCheckpoint);
        assert_eq!(record.points_received, json!(5));
        assert_eq!(record.current_student_learning_goal, json!(12.5));
        assert!(!record.is_practice_mode);
        assert_eq!(record.event_type, EventKind::TaskAttempt);
        assert_eq!(record.timestamp, json!("2025-03-01T10:00:00Z"));
        assert_eq!(record.time_elapsed_readable, json!("1:35"));
        assert_eq!(record.attempts, json!(2));
        assert_eq!(record.accuracy, json!(0.9));
    }

    #[test]
    fn strict_mode_drops_unlinked_sessions() {
        let events = [Event::from_json(json!({
            "type": "task_attempt",
            "sessionId": "anon",
            "taskId": "g2t1",
        }))];

        let strict = run(&events, IdentityMode::Strict);
        assert!(strict.records.is_empty());
        assert_eq!(strict.skipped.unresolved_student, 1);

        let permissive = run(&events, IdentityMode::Permissive);
        assert_eq!(permissive.records.len(), 1);
        assert_eq!(permissive.records[0].student_id, "session_anon");
    }

    #[test]
    fn skips_are_counted_by_reason() {
        let events = [
            Event::from_json(json!({"type": "task_attempt", "studentId": "u1", "taskId": "g1t1"})),
            Event::from_json(json!({"type": "task_attempt", "sessionId": "s1", "studentId": "u1"})),
            Event::from_json(json!({"type": "task_complete", "sessionId": "s1", "taskId": "bonus"})),
            Event::from_json(json!({"type": "page_switch", "sessionId": "s1", "taskId": "g1t1"})),
        ];

        let set = run(&events, IdentityMode::Strict);
        assert!(set.records.is_empty());
        assert_eq!(
            set.skipped,
            SkipCounts {
                missing_session: 1,
                unresolved_student: 0,
                missing_task_id: 1,
                unparseable_task_id: 1,
            }
        );
        assert_eq!(set.skipped.total(), 3);
    }

    #[test]
    fn practice_mode_and_defaults() {
        let events = [
            Event::from_json(json!({
                "type": "task_complete",
                "sessionId": "s1",
                "studentId": "u1",
                "currentTask": "g3t30",
                "currentSemester": "",
            })),
            Event::from_json(json!({
                "type": "task_complete",
                "sessionId": "s1",
                "currentTask": "g3t31",
            })),
        ];

        let set = run(&events, IdentityMode::Strict);
        assert_eq!(set.records.len(), 2);

        let first = &set.records[0];
        assert!(first.is_practice_mode);
        assert_eq!(first.task_level, Difficulty::Hard);
        assert_eq!(first.student_response, "");
        assert!(!first.ai_help_used);
        assert_eq!(first.ai_response, "");
        assert_eq!(first.time_spent_seconds, None);
        assert_eq!(first.time_spent_minutes, None);
        assert_eq!(first.condition, Condition::NoAiNoCheckpoint);
        assert_eq!(first.event_type, EventKind::TaskComplete);
        assert!(set.records[1].is_practice_mode);
    }

    #[test]
    fn output_follows_sorted_order() {
        let events: Vec<Event> = (0..50_u32)
            .map(|i| {
                Event::from_json(json!({
                    "type": "task_attempt",
                    "sessionId": format!("s{}", i % 3),
                    "studentId": format!("u{}", i % 3),
                    "taskId": format!("g2t{i}"),
                    "timeElapsedSeconds": i,
                }))
            })
            .collect();

        let set = run(&events, IdentityMode::Strict);
        let numbers: Vec<u64> = set.records.iter().map(|r| r.task_number).collect();
        assert_eq!(numbers, (0..50).collect::<Vec<u64>>());
        assert_eq!(set.records[0].time_spent_seconds, Some(3.0));
    }

    #[test]
    fn synthetic_ids_are_prefixed() {
        assert_eq!(synthetic_student_id("abc"), "session_abc");
    }
}
