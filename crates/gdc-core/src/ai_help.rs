//! AI help correlation.
//!
//! Help requests and responses are logged as separate events, asynchronously
//! from the task submission they relate to. The index groups them by session
//! and task; a lookup pairs a submission with the first help event recorded
//! within [`AI_HELP_WINDOW_SECONDS`] of it.

use std::collections::HashMap;

use crate::event::{Event, EventKind};
use crate::field;
use crate::task::{TaskType, parse_task_id};

/// Maximum distance, in elapsed seconds, between a submission and a help
/// event for the two to be paired. Inclusive.
pub const AI_HELP_WINDOW_SECONDS: f64 = 60.0;

/// Outcome of an AI help lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiHelp {
    pub used: bool,
    /// The suggestion shown to the student, when one was recorded.
    pub response: Option<String>,
}

/// Help events grouped by `(session_id, task_id)`.
///
/// Buckets keep the order the events were given in.
#[derive(Debug, Clone, Default)]
pub struct AiHelpIndex<'a> {
    sessions: HashMap<&'a str, HashMap<&'a str, Vec<&'a Event>>>,
}

impl<'a> AiHelpIndex<'a> {
    /// Indexes every `ai_task_help` and `ai_help_response` event that names
    /// both a session and a task.
    pub fn build<I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut sessions: HashMap<&'a str, HashMap<&'a str, Vec<&'a Event>>> = HashMap::new();
        for event in events {
            if !event.kind.is_ai_help() {
                continue;
            }
            let (Some(session_id), Some(task_id)) = (&event.session_id, &event.task_id) else {
                continue;
            };
            sessions
                .entry(session_id.as_str())
                .or_default()
                .entry(task_id.as_str())
                .or_default()
                .push(event);
        }

        let index = Self { sessions };
        tracing::debug!(keys = index.len(), "built AI help index");
        index
    }

    /// Number of distinct session/task pairs.
    pub fn len(&self) -> usize {
        self.sessions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Help events recorded for a session/task pair.
    pub fn bucket(&self, session_id: &str, task_id: &str) -> &[&'a Event] {
        self.sessions
            .get(session_id)
            .and_then(|tasks| tasks.get(task_id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Finds help for a submission at `reference_seconds`.
    ///
    /// The first event in the bucket within the window is taken, not the
    /// closest one. Events without a clock count as recorded at 0.
    pub fn query(&self, session_id: &str, task_id: &str, reference_seconds: f64) -> AiHelp {
        let Some(event) = self.bucket(session_id, task_id).iter().find(|event| {
            (reference_seconds - event.elapsed_seconds.unwrap_or(0.0)).abs()
                <= AI_HELP_WINDOW_SECONDS
        }) else {
            return AiHelp::default();
        };

        AiHelp {
            used: true,
            response: help_response(event, task_id).filter(|text| !text.is_empty()),
        }
    }
}

/// Extracts the suggestion text from a matched help event.
///
/// Counting tasks log their suggestion digit by digit in numbered fields; the
/// generic `response` field is used when none of them has content.
fn help_response(event: &Event, task_id: &str) -> Option<String> {
    let help = event.help_fields()?;
    // Falsy responses carry no suggestion.
    let response = || {
        Some(&help.response)
            .filter(|&value| field::truthy(Some(value)))
            .map(field::cell)
            .unwrap_or_default()
    };

    match event.kind {
        EventKind::AiTaskHelp => {
            let is_counting = parse_task_id(task_id)
                .is_some_and(|info| info.task_type == TaskType::Counting);
            if is_counting && !help.suggestion_parts.is_empty() {
                Some(help.suggestion_parts.concat())
            } else {
                Some(response())
            }
        }
        EventKind::AiHelpResponse => Some(response()),
        _ => None,
    }
}
