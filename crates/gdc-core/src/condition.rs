//! Experimental condition classification.

use std::fmt;

/// Experimental condition a student played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
    NoAiCheckpoint,
    NoAiNoCheckpoint,
    AiCheckpoint,
    AiNoCheckpoint,
    Admin,
    AdminTest,
    Unknown,
}

impl Condition {
    /// Label used in output tables.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoAiCheckpoint => "No_AI_CP",
            Self::NoAiNoCheckpoint => "No_AI_NCP",
            Self::AiCheckpoint => "AI_CP",
            Self::AiNoCheckpoint => "AI_NCP",
            Self::Admin => "Admin",
            Self::AdminTest => "Admin_Test",
            Self::Unknown => "Unknown",
        }
    }

    /// Maps a class section name to its condition.
    pub fn from_section(section: &str) -> Self {
        match section {
            "01A-Checkpoint" => Self::NoAiCheckpoint,
            "01A-No Checkpoint" => Self::NoAiNoCheckpoint,
            "02A-Checkpoint" => Self::AiCheckpoint,
            "02A-No Checkpoint" => Self::AiNoCheckpoint,
            "ADMIN" => Self::Admin,
            "ADMIN-TEST" => Self::AdminTest,
            _ => Self::Unknown,
        }
    }

    /// Maps the game configuration flags to a condition.
    pub const fn from_flags(has_ai: bool, has_checkpoint: bool) -> Self {
        match (has_ai, has_checkpoint) {
            (true, true) => Self::AiCheckpoint,
            (true, false) => Self::AiNoCheckpoint,
            (false, true) => Self::NoAiCheckpoint,
            (false, false) => Self::NoAiNoCheckpoint,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of an event that determine its condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionInputs {
    /// Class section, absent when missing or empty.
    pub section: Option<String>,
    pub has_ai: bool,
    pub has_checkpoint: bool,
}

impl ConditionInputs {
    /// Classifies the event.
    ///
    /// A section always wins over the flags, even when it is unrecognized.
    pub fn classify(&self) -> Condition {
        self.section.as_deref().map_or_else(
            || Condition::from_flags(self.has_ai, self.has_checkpoint),
            Condition::from_section,
        )
    }
}
