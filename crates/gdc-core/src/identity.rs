//! Session to student identity resolution.

use std::collections::{HashMap, HashSet};

use crate::event::Event;

/// A session observed with a second, different student ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConflict {
    pub session_id: String,
    /// The retained mapping.
    pub first: String,
    pub conflicting: String,
}

/// Lookup from session ID to student ID.
///
/// Built once, first write wins. Later events that name a different student
/// for a known session are recorded as conflicts and never change the map.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    students: HashMap<String, String>,
    conflicts: Vec<IdentityConflict>,
}

impl IdentityMap {
    /// Builds the map by iterating `events` in order.
    ///
    /// Events missing either ID are skipped. Each distinct conflicting
    /// student ID is reported once per session.
    pub fn build<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut students: HashMap<String, String> = HashMap::new();
        let mut conflicts = Vec::new();
        let mut seen_conflicts: HashSet<(String, String)> = HashSet::new();

        for event in events {
            let (Some(session_id), Some(student_id)) = (&event.session_id, &event.student_id)
            else {
                continue;
            };

            match students.get(session_id) {
                None => {
                    students.insert(session_id.clone(), student_id.clone());
                }
                Some(first) if first != student_id => {
                    if seen_conflicts.insert((session_id.clone(), student_id.clone())) {
                        tracing::warn!(
                            session_id = %session_id,
                            first = %first,
                            conflicting = %student_id,
                            "session mapped to multiple student IDs"
                        );
                        conflicts.push(IdentityConflict {
                            session_id: session_id.clone(),
                            first: first.clone(),
                            conflicting: student_id.clone(),
                        });
                    }
                }
                Some(_) => {}
            }
        }

        tracing::debug!(
            sessions = students.len(),
            conflicts = conflicts.len(),
            "built session-to-student mapping"
        );

        Self {
            students,
            conflicts,
        }
    }

    /// Returns the student for a session, if any event linked them.
    pub fn resolve(&self, session_id: &str) -> Option<&str> {
        self.students.get(session_id).map(String::as_str)
    }

    /// Conflicts found while building, in discovery order.
    pub fn conflicts(&self) -> &[IdentityConflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Up to `n` mappings, ordered by session ID.
    pub fn sample(&self, n: usize) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .students
            .iter()
            .map(|(session, student)| (session.as_str(), student.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs.truncate(n);
        pairs
    }
}
