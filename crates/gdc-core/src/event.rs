//! Gameplay telemetry events.
//!
//! Events arrive as loosely shaped JSON objects. They are decoded once into
//! [`Event`], which keeps only the fields the cleaning pipeline reads and
//! applies the default-value policy in one place.

use std::fmt;
use std::str::FromStr;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::condition::ConditionInputs;
use crate::field;

/// Number of numbered suggestion fields (`"0"` through `"9"`) on help events.
pub const SUGGESTION_SLOTS: usize = 10;

/// Event types the pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TaskAttempt,
    TaskComplete,
    AiTaskHelp,
    AiHelpResponse,
    PageSwitch,
    /// Any other or missing type.
    Other,
}

impl EventKind {
    /// Task submissions, the events that become cleaned records.
    pub const fn is_task(self) -> bool {
        matches!(self, Self::TaskAttempt | Self::TaskComplete)
    }

    /// Events recording an AI assistance interaction.
    pub const fn is_ai_help(self) -> bool {
        matches!(self, Self::AiTaskHelp | Self::AiHelpResponse)
    }

    /// Events that end the time spent on the preceding task.
    pub const fn is_task_boundary(self) -> bool {
        matches!(self, Self::TaskAttempt | Self::TaskComplete | Self::PageSwitch)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TaskAttempt => "task_attempt",
            Self::TaskComplete => "task_complete",
            Self::AiTaskHelp => "ai_task_help",
            Self::AiHelpResponse => "ai_help_response",
            Self::PageSwitch => "page_switch",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_attempt" => Ok(Self::TaskAttempt),
            "task_complete" => Ok(Self::TaskComplete),
            "ai_task_help" => Ok(Self::AiTaskHelp),
            "ai_help_response" => Ok(Self::AiHelpResponse),
            "page_switch" => Ok(Self::PageSwitch),
            _ => Err(UnknownEventKind(s.to_string())),
        }
    }
}

/// Error type for event type strings the pipeline does not track.
#[derive(Debug, Clone)]
pub struct UnknownEventKind(String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}

/// A decoded telemetry event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub session_id: Option<String>,
    pub student_id: Option<String>,
    /// `taskId`, falling back to `currentTask`.
    pub task_id: Option<String>,
    /// Seconds since the session started (`timeElapsedSeconds`).
    pub elapsed_seconds: Option<f64>,
    pub condition: ConditionInputs,
    pub detail: EventDetail,
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    Task(TaskFields),
    AiHelp(HelpFields),
    None,
}

/// Fields carried through from task submissions. Values are kept raw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFields {
    pub semester: Value,
    pub user_answer: Value,
    pub correct_answer: Value,
    /// `pointsEarned`, falling back to `points` only when the key is absent.
    pub points: Value,
    pub student_learning: Value,
    pub timestamp: Value,
    pub readable_time: Value,
    pub attempts: Value,
    pub accuracy: Value,
}

/// Content of an AI help interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelpFields {
    /// The generic `response` field.
    pub response: Value,
    /// Non-empty numbered suggestion fields, in ascending key order.
    pub suggestion_parts: Vec<String>,
}

impl Event {
    /// Decodes a single JSON value. Never fails: anything that is not an
    /// object decodes to an event with every field absent.
    pub fn from_json(value: Value) -> Self {
        serde_json::from_value::<RawEvent>(value)
            .unwrap_or_default()
            .into()
    }

    /// Task submission fields, if this is a task event.
    pub const fn task_fields(&self) -> Option<&TaskFields> {
        match &self.detail {
            EventDetail::Task(fields) => Some(fields),
            _ => None,
        }
    }

    /// Help payload, if this is an AI help event.
    pub const fn help_fields(&self) -> Option<&HelpFields> {
        match &self.detail {
            EventDetail::AiHelp(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Minimal struct for typed deserialization of the fields we read.
///
/// Every field is an untyped `Value` so that a wrongly typed field degrades
/// to a default instead of rejecting the whole event.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawEvent {
    #[serde(rename = "type")]
    kind: Option<Value>,
    session_id: Option<Value>,
    student_id: Option<Value>,
    task_id: Option<Value>,
    current_task: Option<Value>,
    time_elapsed_seconds: Option<Value>,
    section: Option<Value>,
    #[serde(rename = "hasAI")]
    has_ai: Option<Value>,
    has_checkpoint: Option<Value>,
    current_semester: Option<Value>,
    user_answer: Option<Value>,
    correct_answer: Option<Value>,
    #[serde(deserialize_with = "present")]
    points_earned: Option<Value>,
    points: Option<Value>,
    student_learning: Option<Value>,
    timestamp: Option<Value>,
    readable_time: Option<Value>,
    attempts: Option<Value>,
    accuracy: Option<Value>,
    response: Option<Value>,
    #[serde(flatten)]
    suggestions: SuggestionSlots,
}

/// Numbered suggestion fields collected from the remaining keys of an event.
#[derive(Debug, Default)]
struct SuggestionSlots([Option<Value>; SUGGESTION_SLOTS]);

impl<'de> Deserialize<'de> for SuggestionSlots {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SlotVisitor;

        impl<'de> Visitor<'de> for SlotVisitor {
            type Value = SuggestionSlots;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of event fields")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut slots = SuggestionSlots::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.parse::<usize>() {
                        Ok(slot) if slot < SUGGESTION_SLOTS && key.len() == 1 => {
                            slots.0[slot] = Some(map.next_value()?);
                        }
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(slots)
            }
        }

        deserializer.deserialize_map(SlotVisitor)
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`, so presence of the key
/// is distinguishable from absence.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn raw(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}

impl From<RawEvent> for Event {
    fn from(raw_event: RawEvent) -> Self {
        let kind = field::text(raw_event.kind.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or(EventKind::Other);

        let task_id = field::text(raw_event.task_id.as_ref())
            .or_else(|| field::text(raw_event.current_task.as_ref()));

        let condition = ConditionInputs {
            section: field::text(raw_event.section.as_ref()),
            has_ai: field::truthy(raw_event.has_ai.as_ref()),
            has_checkpoint: field::truthy(raw_event.has_checkpoint.as_ref()),
        };

        let detail = if kind.is_task() {
            EventDetail::Task(TaskFields {
                semester: raw(raw_event.current_semester),
                user_answer: raw(raw_event.user_answer),
                correct_answer: raw(raw_event.correct_answer),
                points: raw(raw_event.points_earned.or(raw_event.points)),
                student_learning: raw(raw_event.student_learning),
                timestamp: raw(raw_event.timestamp),
                readable_time: raw(raw_event.readable_time),
                attempts: raw(raw_event.attempts),
                accuracy: raw(raw_event.accuracy),
            })
        } else if kind.is_ai_help() {
            let suggestion_parts = raw_event
                .suggestions
                .0
                .iter()
                .filter_map(|slot| slot.as_ref().filter(|&value| field::truthy(Some(value))))
                .map(field::cell)
                .collect();
            EventDetail::AiHelp(HelpFields {
                response: raw(raw_event.response),
                suggestion_parts,
            })
        } else {
            EventDetail::None
        };

        Self {
            kind,
            session_id: field::text(raw_event.session_id.as_ref()),
            student_id: field::text(raw_event.student_id.as_ref()),
            task_id,
            elapsed_seconds: field::number(raw_event.time_elapsed_seconds.as_ref()),
            condition,
            detail,
        }
    }
}
