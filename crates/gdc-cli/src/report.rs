//! Console summary printed after a cleaning run.

use std::collections::HashMap;
use std::collections::HashSet;
use std::io::Write;

use anyhow::Result;
use gdc_core::{CleanedData, RECORD_COLUMNS, record_row};

use crate::output::OutputPaths;

/// Number of records echoed in the sample section.
const SAMPLE_RECORDS: usize = 5;

/// Longest value echoed before truncation, in characters.
const MAX_VALUE_CHARS: usize = 50;

/// Counts labels, ordered by count descending then label.
fn distribution<'a, I>(labels: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    sorted
}

fn truncate(value: &str) -> String {
    if value.chars().count() > MAX_VALUE_CHARS {
        let head: String = value.chars().take(MAX_VALUE_CHARS).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}

/// Writes the run summary.
#[allow(clippy::cast_precision_loss)]
pub fn write_report<W: Write>(
    writer: &mut W,
    data: &CleanedData,
    paths: &OutputPaths,
    sampled: bool,
) -> Result<()> {
    let records = &data.records;

    writeln!(writer, "=== DATA SUMMARY ===")?;
    writeln!(writer, "Events processed: {}", data.events_considered)?;
    writeln!(writer, "Total records: {}", records.len())?;

    if records.is_empty() {
        writeln!(writer, "No task submissions qualified; wrote header-only tables.")?;
    } else {
        let students: HashSet<&str> = records.iter().map(|r| r.student_id.as_str()).collect();
        writeln!(writer, "Unique students: {}", students.len())?;

        writeln!(writer)?;
        writeln!(writer, "Task Type Distribution:")?;
        for (label, count) in distribution(records.iter().map(|r| r.task_type.as_str())) {
            writeln!(writer, "  {label}: {count}")?;
        }

        writeln!(writer)?;
        writeln!(writer, "Condition Distribution:")?;
        for (label, count) in distribution(records.iter().map(|r| r.condition.as_str())) {
            writeln!(writer, "  {label}: {count}")?;
        }

        let with_help = records.iter().filter(|r| r.ai_help_used).count();
        let rate = with_help as f64 / records.len() as f64 * 100.0;
        writeln!(writer)?;
        writeln!(writer, "AI Help Usage:")?;
        writeln!(writer, "Tasks with AI help: {with_help}")?;
        writeln!(writer, "Tasks without AI help: {}", records.len() - with_help)?;
        writeln!(writer, "AI help usage rate: {rate:.2}%")?;
    }

    if data.skipped.total() > 0 {
        writeln!(writer)?;
        writeln!(writer, "Skipped task events: {}", data.skipped.total())?;
    }
    if !data.conflicts.is_empty() {
        writeln!(writer, "Conflicting student IDs ignored: {}", data.conflicts.len())?;
    }

    if !records.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "=== SAMPLE DATA ===")?;
        for (i, record) in records.iter().take(SAMPLE_RECORDS).enumerate() {
            writeln!(writer)?;
            writeln!(writer, "Record {}:", i + 1)?;
            for (column, value) in RECORD_COLUMNS.iter().zip(record_row(record)) {
                let line = format!("  {column}: {}", truncate(&value));
                writeln!(writer, "{}", line.trim_end())?;
            }
        }
    }

    let dataset = if sampled { "Sample" } else { "Full" };
    writeln!(writer)?;
    writeln!(writer, "=== DATA CLEANING COMPLETE ===")?;
    writeln!(writer, "Output files created:")?;
    writeln!(
        writer,
        "1. {} - {dataset} cleaned dataset",
        paths.records.display()
    )?;
    writeln!(
        writer,
        "2. {} - Summary statistics by student",
        paths.summary.display()
    )?;

    Ok(())
}
