//! The in-memory event store.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::IgnoredAny;
use thiserror::Error;

use crate::event::{Event, RawEvent};

/// Errors loading the input document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The input is not a JSON array.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One element of the top-level array.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Event(RawEvent),
    Other(IgnoredAny),
}

/// All events of one input document, in document order.
///
/// Loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    /// Parses a JSON array of events.
    ///
    /// Only the top-level structure is validated; elements that are not
    /// objects become empty events.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<RawEntry> = serde_json::from_str(json)?;
        let events = entries
            .into_iter()
            .map(|entry| match entry {
                RawEntry::Event(raw) => Event::from(raw),
                RawEntry::Other(_) => Event::from(RawEvent::default()),
            })
            .collect();
        Ok(Self { events })
    }

    /// Reads and parses the input file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), events = store.len(), "loaded events");
        Ok(store)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub const fn len(&self) -> usize {
        self.events.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The first `limit` events (all when `None`), stably sorted by elapsed
    /// seconds. Events without a clock sort as if at 0.
    pub fn time_sorted(&self, limit: Option<usize>) -> Vec<&Event> {
        let end = limit.map_or(self.events.len(), |n| n.min(self.events.len()));
        let mut sorted: Vec<&Event> = self.events[..end].iter().collect();
        sorted.sort_by(|a, b| compare_clock(a, b));
        sorted
    }
}

fn compare_clock(a: &Event, b: &Event) -> Ordering {
    a.elapsed_seconds
        .unwrap_or(0.0)
        .total_cmp(&b.elapsed_seconds.unwrap_or(0.0))
}
