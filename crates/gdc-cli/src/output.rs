//! Output file naming and atomic writes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Base name of the cleaned records table.
const RECORDS_STEM: &str = "cleaned_game_data";

/// Base name of the student summary table.
const SUMMARY_STEM: &str = "game_data_summary";

/// Suffix distinguishing runs with different modifiers.
///
/// `_all_sessions` comes first, then `_sample<N>`.
pub fn output_suffix(all_sessions: bool, sample_size: Option<usize>) -> String {
    let mut suffix = String::new();
    if all_sessions {
        suffix.push_str("_all_sessions");
    }
    if let Some(n) = sample_size {
        suffix.push_str(&format!("_sample{n}"));
    }
    suffix
}

/// Where one run writes its tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub records: PathBuf,
    pub summary: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: &Path, suffix: &str) -> Self {
        Self {
            records: dir.join(format!("{RECORDS_STEM}{suffix}.csv")),
            summary: dir.join(format!("{SUMMARY_STEM}{suffix}.csv")),
        }
    }
}

/// Writes `contents` to `path` through a temporary file and a rename, so
/// readers never see a half-written table.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        // Clean up temp file
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("failed to write {}", path.display()));
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote table");
    Ok(())
}
