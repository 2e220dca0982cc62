//! CSV rendering of the output tables.

use std::borrow::Cow;

use crate::field;
use crate::record::CleanedRecord;
use crate::summary::StudentSummary;

/// Column order of the cleaned records table.
pub const RECORD_COLUMNS: [&str; 22] = [
    "student_id",
    "session_id",
    "semester",
    "task_number",
    "task_type",
    "task_level",
    "task_id",
    "student_response",
    "correct_response",
    "ai_help_used",
    "ai_response",
    "time_spent_seconds",
    "time_spent_minutes",
    "condition",
    "points_received",
    "current_student_learning_goal",
    "is_practice_mode",
    "event_type",
    "timestamp",
    "time_elapsed_readable",
    "attempts",
    "accuracy",
];

/// Column order of the student summary table.
pub const SUMMARY_COLUMNS: [&str; 10] = [
    "student_id",
    "condition",
    "max_semester_reached",
    "total_tasks_attempted",
    "total_points_earned",
    "total_time_minutes",
    "ai_help_count",
    "task_types_attempted",
    "ai_help_rate",
    "avg_time_per_task",
];

/// Sorts records for export: student ID, numeric semester, then the raw
/// timestamp compared as text. Stable, so ties keep time-sorted order.
pub fn sort_for_export(records: &mut [CleanedRecord]) {
    records.sort_by_cached_key(|record| {
        (
            record.student_id.clone(),
            record.semester_number(),
            field::cell(&record.timestamp),
        )
    });
}

/// Quotes a field when it contains a separator, quote or line break.
fn escape(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn push_row<I, S>(out: &mut String, cells: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(cell.as_ref()));
    }
    out.push('\n');
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Cells of one record, in [`RECORD_COLUMNS`] order.
pub fn record_row(record: &CleanedRecord) -> [String; 22] {
    [
        record.student_id.clone(),
        record.session_id.clone(),
        field::cell(&record.semester),
        record.task_number.to_string(),
        record.task_type.to_string(),
        record.task_level.to_string(),
        record.task_id.clone(),
        record.student_response.clone(),
        record.correct_response.clone(),
        record.ai_help_used.to_string(),
        record.ai_response.clone(),
        optional(record.time_spent_seconds),
        optional(record.time_spent_minutes),
        record.condition.to_string(),
        field::cell(&record.points_received),
        field::cell(&record.current_student_learning_goal),
        record.is_practice_mode.to_string(),
        record.event_type.to_string(),
        field::cell(&record.timestamp),
        field::cell(&record.time_elapsed_readable),
        field::cell(&record.attempts),
        field::cell(&record.accuracy),
    ]
}

/// Renders the cleaned records table, header included.
pub fn render_records(records: &[CleanedRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, RECORD_COLUMNS);
    for record in records {
        push_row(&mut out, record_row(record));
    }
    out
}

fn summary_row(summary: &StudentSummary) -> [String; 10] {
    [
        summary.student_id.clone(),
        summary.condition.to_string(),
        summary.max_semester_reached.to_string(),
        summary.total_tasks_attempted.to_string(),
        summary.total_points_earned.to_string(),
        summary.total_time_minutes.to_string(),
        summary.ai_help_count.to_string(),
        summary.task_types_attempted.to_string(),
        summary.ai_help_rate.to_string(),
        summary.avg_time_per_task.to_string(),
    ]
}

/// Renders the student summary table, header included.
pub fn render_summaries(summaries: &[StudentSummary]) -> String {
    let mut out = String::new();
    push_row(&mut out, SUMMARY_COLUMNS);
    for summary in summaries {
        push_row(&mut out, summary_row(summary));
    }
    out
}
