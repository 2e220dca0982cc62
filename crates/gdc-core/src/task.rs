//! Task identifier parsing.
//!
//! Task IDs look like `g2t42`: a game number (1-3) followed by a task number.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Pre-compiled task ID pattern. Anchored at the start only, so trailing
/// text after the digits is ignored.
static TASK_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^g([123])t(\d+)").unwrap());

/// Highest task number still rated easy.
pub const EASY_MAX_TASK: u64 = 10;

/// Highest task number still rated medium.
pub const MEDIUM_MAX_TASK: u64 = 24;

/// The mini-game a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskType {
    Counting,
    Slider,
    Typing,
}

impl TaskType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Counting => "counting",
            Self::Slider => "slider",
            Self::Typing => "typing",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty band derived from the task number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Bands a task number: up to 10 is easy, up to 24 medium, the rest hard.
    pub const fn for_task_number(number: u64) -> Self {
        if number <= EASY_MAX_TASK {
            Self::Easy
        } else if number <= MEDIUM_MAX_TASK {
            Self::Medium
        } else {
            Self::Hard
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully parsed task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskInfo {
    pub task_type: TaskType,
    pub difficulty: Difficulty,
    pub number: u64,
}

/// Parses a task ID such as `g1t5`.
///
/// Returns `None` for anything that does not start with the task pattern,
/// including the empty string. A task number too large for `u64` is also
/// treated as unparseable.
pub fn parse_task_id(task_id: &str) -> Option<TaskInfo> {
    let caps = TASK_ID_RE.captures(task_id)?;
    let task_type = match &caps[1] {
        "1" => TaskType::Counting,
        "2" => TaskType::Slider,
        _ => TaskType::Typing,
    };
    let number: u64 = caps[2].parse().ok()?;
    Some(TaskInfo {
        task_type,
        difficulty: Difficulty::for_task_number(number),
        number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(task_id: &str) -> Option<(TaskType, Difficulty, u64)> {
        parse_task_id(task_id).map(|info| (info.task_type, info.difficulty, info.number))
    }

    #[test]
    fn parses_each_game() {
        assert_eq!(parsed("g1t5"), Some((TaskType::Counting, Difficulty::Easy, 5)));
        assert_eq!(parsed("g2t42"), Some((TaskType::Slider, Difficulty::Hard, 42)));
        assert_eq!(parsed("g3t24"), Some((TaskType::Typing, Difficulty::Medium, 24)));
    }

    #[test]
    fn difficulty_thresholds_are_inclusive() {
        assert_eq!(Difficulty::for_task_number(0), Difficulty::Easy);
        assert_eq!(Difficulty::for_task_number(10), Difficulty::Easy);
        assert_eq!(Difficulty::for_task_number(11), Difficulty::Medium);
        assert_eq!(Difficulty::for_task_number(24), Difficulty::Medium);
        assert_eq!(Difficulty::for_task_number(25), Difficulty::Hard);
        assert_eq!(parsed("g3t25"), Some((TaskType::Typing, Difficulty::Hard, 25)));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(parsed("xyz"), None);
        assert_eq!(parsed(""), None);
        assert_eq!(parsed("g4t1"), None);
        assert_eq!(parsed("g1t"), None);
        assert_eq!(parsed(" g1t5"), None);
        assert_eq!(parsed("g1t99999999999999999999999"), None);
    }

    #[test]
    fn ignores_trailing_text() {
        assert_eq!(parsed("g1t07-retry"), Some((TaskType::Counting, Difficulty::Easy, 7)));
    }

    #[test]
    fn labels() {
        assert_eq!(TaskType::Slider.to_string(), "slider");
        assert_eq!(Difficulty::Medium.to_string(), "Medium");
    }
}
