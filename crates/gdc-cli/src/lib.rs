//! Game telemetry cleaner CLI library.
//!
//! Loads the event dump, runs the cleaning pipeline and writes both tables.

mod cli;
mod config;
pub mod output;
pub mod report;

use std::io::Write;

use anyhow::{Context, Result};
use gdc_core::{CleanOptions, EventStore, IdentityMode, clean, render_records, render_summaries};

pub use cli::Cli;
pub use config::Config;

use crate::output::{OutputPaths, output_suffix, write_atomic};

/// Runs one cleaning pass and writes the report to `out`.
///
/// Both tables are rendered before either file is written, so a failed run
/// leaves no partial output behind.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let mut config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(input) = &cli.input {
        config.input_path.clone_from(input);
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    tracing::debug!(?config, "loaded configuration");

    let mode = if cli.all_sessions || !config.require_student_id {
        IdentityMode::Permissive
    } else {
        IdentityMode::Strict
    };
    // A sample of zero means no limit.
    let sample_size = cli.sample_size.filter(|&n| n > 0);

    let store = EventStore::load(&config.input_path)
        .with_context(|| format!("failed to load events from {}", config.input_path.display()))?;

    let data = clean(&store, CleanOptions { mode, sample_size });
    tracing::debug!(
        missing_session = data.skipped.missing_session,
        unresolved_student = data.skipped.unresolved_student,
        missing_task_id = data.skipped.missing_task_id,
        unparseable_task_id = data.skipped.unparseable_task_id,
        "skipped task events"
    );

    let records_csv = render_records(&data.records);
    let summary_csv = render_summaries(&data.summaries);

    let paths = OutputPaths::new(
        &config.output_dir,
        &output_suffix(mode == IdentityMode::Permissive, sample_size),
    );
    write_atomic(&paths.records, &records_csv)?;
    write_atomic(&paths.summary, &summary_csv)?;
    tracing::info!(
        records = data.records.len(),
        summaries = data.summaries.len(),
        "wrote output tables"
    );

    report::write_report(out, &data, &paths, sample_size.is_some())
}
