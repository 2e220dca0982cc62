//! Time-on-task estimation.
//!
//! The time a student spent on a task is the gap between its submission and
//! the next task boundary (`task_attempt`, `task_complete` or `page_switch`)
//! in the same session, measured on the `timeElapsedSeconds` clock.

use std::collections::HashMap;

use crate::event::Event;

/// Per-session positions and clocks of boundary events.
///
/// Built once over the time-sorted sequence so each lookup is a binary
/// search instead of a forward scan over every later event.
#[derive(Debug, Clone, Default)]
pub struct BoundaryIndex<'a> {
    sessions: HashMap<&'a str, Vec<(usize, f64)>>,
}

impl<'a> BoundaryIndex<'a> {
    /// Indexes `sorted`, which must be the same sequence later positions
    /// refer to. Boundaries without a clock are left out.
    pub fn build(sorted: &[&'a Event]) -> Self {
        let mut sessions: HashMap<&'a str, Vec<(usize, f64)>> = HashMap::new();
        for (position, event) in sorted.iter().enumerate() {
            if !event.kind.is_task_boundary() {
                continue;
            }
            let (Some(session_id), Some(seconds)) = (&event.session_id, event.elapsed_seconds)
            else {
                continue;
            };
            sessions
                .entry(session_id.as_str())
                .or_default()
                .push((position, seconds));
        }
        Self { sessions }
    }

    /// Seconds from the event at `position` to the next boundary of its
    /// session.
    ///
    /// Negative gaps from out-of-order clocks clamp to 0. Returns `None` when
    /// the event has no clock or session, or nothing follows it.
    pub fn time_on_task(&self, position: usize, event: &Event) -> Option<f64> {
        let current = event.elapsed_seconds?;
        let boundaries = self.sessions.get(event.session_id.as_deref()?)?;
        let next = boundaries.partition_point(|&(at, _)| at <= position);
        boundaries
            .get(next)
            .map(|&(_, seconds)| (seconds - current).max(0.0))
    }
}
