//! Per-student summary statistics.

use std::collections::{BTreeMap, BTreeSet};

use crate::condition::Condition;
use crate::field;
use crate::record::CleanedRecord;
use crate::task::TaskType;

/// Aggregate statistics for one student under one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSummary {
    pub student_id: String,
    pub condition: Condition,
    pub max_semester_reached: u64,
    pub total_tasks_attempted: usize,
    pub total_points_earned: f64,
    pub total_time_minutes: f64,
    pub ai_help_count: usize,
    pub task_types_attempted: usize,
    /// Share of attempts with AI help, rounded to 3 decimals.
    pub ai_help_rate: f64,
    /// Mean minutes per attempt, rounded to 2 decimals.
    pub avg_time_per_task: f64,
}

#[derive(Debug, Default)]
struct Accumulator {
    max_semester: u64,
    attempted: usize,
    points: f64,
    minutes: f64,
    ai_help_count: usize,
    task_types: BTreeSet<TaskType>,
}

impl Accumulator {
    fn add(&mut self, record: &CleanedRecord) {
        self.attempted += 1;
        self.max_semester = self.max_semester.max(record.semester_number());
        self.points += field::number(Some(&record.points_received)).unwrap_or(0.0);
        self.minutes += record.time_spent_minutes.unwrap_or(0.0);
        if record.ai_help_used {
            self.ai_help_count += 1;
        }
        self.task_types.insert(record.task_type);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, student_id: String, condition: Condition) -> StudentSummary {
        let (ai_help_rate, avg_time_per_task) = if self.attempted == 0 {
            (0.0, 0.0)
        } else {
            let attempted = self.attempted as f64;
            (
                round_to(self.ai_help_count as f64 / attempted, 3),
                round_to(self.minutes / attempted, 2),
            )
        };

        StudentSummary {
            student_id,
            condition,
            max_semester_reached: self.max_semester,
            total_tasks_attempted: self.attempted,
            total_points_earned: self.points,
            total_time_minutes: self.minutes,
            ai_help_count: self.ai_help_count,
            task_types_attempted: self.task_types.len(),
            ai_help_rate,
            avg_time_per_task,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// Folds records into one summary per `(student_id, condition)`.
///
/// Output is ordered by student ID, then by condition. Unparseable points
/// and unknown times contribute nothing.
pub fn summarize(records: &[CleanedRecord]) -> Vec<StudentSummary> {
    let mut groups: BTreeMap<(&str, Condition), Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.student_id.as_str(), record.condition))
            .or_default()
            .add(record);
    }

    groups
        .into_iter()
        .map(|((student_id, condition), acc)| acc.finish(student_id.to_string(), condition))
        .collect()
}

#[cfg(test)]
#[expect(
    clippy::float_cmp,
    reason = "exact equality intended for rounded aggregates"
)]
mod tests {
    use super::*;

    use serde_json::{Value, json};

    use crate::event::EventKind;
    use crate::task::Difficulty;

    fn record(student: &str, condition: Condition, task_type: TaskType) -> CleanedRecord {
        CleanedRecord {
            student_id: student.to_string(),
            session_id: "s1".to_string(),
            semester: json!(1),
            task_number: 1,
            task_type,
            task_level: Difficulty::Easy,
            task_id: "g1t1".to_string(),
            student_response: String::new(),
            correct_response: String::new(),
            ai_help_used: false,
            ai_response: String::new(),
            time_spent_seconds: None,
            time_spent_minutes: None,
            condition,
            points_received: Value::Null,
            current_student_learning_goal: Value::Null,
            is_practice_mode: false,
            event_type: EventKind::TaskAttempt,
            timestamp: Value::Null,
            time_elapsed_readable: Value::Null,
            attempts: Value::Null,
            accuracy: Value::Null,
        }
    }

    #[test]
    fn tolerates_bad_points_and_unknown_time() {
        let mut first = record("u1", Condition::AiCheckpoint, TaskType::Counting);
        first.points_received = json!(5);
        first.time_spent_minutes = Some(2.0);
        first.ai_help_used = true;

        let mut second = record("u1", Condition::AiCheckpoint, TaskType::Counting);
        second.points_received = json!("bad");

        let summaries = summarize(&[first, second]);
        assert_eq!(summaries.len(), 1);

        let summary = &summaries[0];
        assert_eq!(summary.total_points_earned, 5.0);
        assert_eq!(summary.total_time_minutes, 2.0);
        assert_eq!(summary.ai_help_count, 1);
        assert_eq!(summary.total_tasks_attempted, 2);
        assert_eq!(summary.ai_help_rate, 0.5);
        assert_eq!(summary.avg_time_per_task, 1.0);
        assert_eq!(summary.task_types_attempted, 1);
    }

    #[test]
    fn groups_by_student_and_condition() {
        let records = [
            record("u2", Condition::NoAiCheckpoint, TaskType::Slider),
            record("u1", Condition::AiNoCheckpoint, TaskType::Typing),
            record("u1", Condition::AiCheckpoint, TaskType::Slider),
            record("u1", Condition::AiNoCheckpoint, TaskType::Counting),
        ];

        let keys: Vec<_> = summarize(&records)
            .into_iter()
            .map(|s| (s.student_id, s.condition, s.task_types_attempted))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("u1".to_string(), Condition::AiCheckpoint, 1),
                ("u1".to_string(), Condition::AiNoCheckpoint, 2),
                ("u2".to_string(), Condition::NoAiCheckpoint, 1),
            ]
        );
    }

    #[test]
    fn tracks_max_numeric_semester() {
        let mut a = record("u1", Condition::Admin, TaskType::Typing);
        a.semester = json!("2");
        let mut b = record("u1", Condition::Admin, TaskType::Typing);
        b.semester = json!("final");
        let mut c = record("u1", Condition::Admin, TaskType::Typing);
        c.semester = json!(1);

        let summaries = summarize(&[a, b, c]);
        assert_eq!(summaries[0].max_semester_reached, 2);
    }

    #[test]
    fn rates_are_rounded() {
        let mut records: Vec<CleanedRecord> = (0..3)
            .map(|_| record("u1", Condition::Unknown, TaskType::Slider))
            .collect();
        records[0].ai_help_used = true;
        records[0].time_spent_minutes = Some(1.0);
        records[1].points_received = json!("2.5");

        let summary = &summarize(&records)[0];
        assert_eq!(summary.ai_help_rate, 0.333);
        assert_eq!(summary.avg_time_per_task, 0.33);
        assert_eq!(summary.total_points_earned, 2.5);
    }

    #[test]
    fn empty_input_has_no_summaries() {
        assert!(summarize(&[]).is_empty());
    }
}
