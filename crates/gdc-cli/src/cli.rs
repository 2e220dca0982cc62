//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Game telemetry cleaner.
///
/// Turns the raw event dump of the learning game into a cleaned per-attempt
/// table and a per-student summary table.
#[derive(Debug, Parser)]
#[command(name = "gdc", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Event dump to read (overrides `input_path`).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory for the output tables (overrides `output_dir`).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Include sessions without a linked student ID.
    #[arg(long)]
    pub all_sessions: bool,

    /// Process only the first N events.
    #[arg(value_name = "SAMPLE_SIZE")]
    pub sample_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sample_and_all_sessions_in_any_order() {
        let cli = Cli::try_parse_from(["gdc", "--all-sessions", "1000"]).unwrap();
        assert!(cli.all_sessions);
        assert_eq!(cli.sample_size, Some(1000));

        let cli = Cli::try_parse_from(["gdc", "1000", "--all-sessions"]).unwrap();
        assert!(cli.all_sessions);
        assert_eq!(cli.sample_size, Some(1000));
    }

    #[test]
    fn defaults_to_strict_full_run() {
        let cli = Cli::try_parse_from(["gdc"]).unwrap();
        assert!(!cli.all_sessions);
        assert_eq!(cli.sample_size, None);
    }

    #[test]
    fn rejects_unknown_arguments() {
        let err = Cli::try_parse_from(["gdc", "--everything"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);

        let err = Cli::try_parse_from(["gdc", "lots"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn help_is_a_display_request() {
        let err = Cli::try_parse_from(["gdc", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
