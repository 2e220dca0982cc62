//! Core cleaning logic for educational game telemetry.
//!
//! This crate turns a flat event log into:
//! - Cleaned records: one row per task submission, with identity, AI help,
//!   time-on-task and experimental condition resolved
//! - Student summaries: per student and condition aggregates
//!
//! The lookups (session to student, AI help by task) are built once from the
//! whole document and shared read-only by the record pass.

pub mod ai_help;
pub mod condition;
pub mod event;
pub mod field;
pub mod identity;
pub mod pipeline;
pub mod record;
pub mod store;
pub mod summary;
pub mod table;
pub mod task;
pub mod timing;

pub use ai_help::{AI_HELP_WINDOW_SECONDS, AiHelp, AiHelpIndex};
pub use condition::{Condition, ConditionInputs};
pub use event::{Event, EventDetail, EventKind, HelpFields, TaskFields};
pub use identity::{IdentityConflict, IdentityMap};
pub use pipeline::{CleanOptions, CleanedData, clean};
pub use record::{
    CleanedRecord, IdentityMode, Lookups, RecordSet, SkipCounts, SkipReason, build_records,
};
pub use store::{EventStore, LoadError};
pub use summary::{StudentSummary, summarize};
pub use table::{RECORD_COLUMNS, SUMMARY_COLUMNS, record_row, render_records, render_summaries};
pub use task::{Difficulty, TaskInfo, TaskType, parse_task_id};
pub use timing::BoundaryIndex;
