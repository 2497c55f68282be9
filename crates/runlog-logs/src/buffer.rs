use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use runlog_types::{LogLevel, LogRecord};

use crate::classify::ClassifyLevel;

#[derive(Default)]
struct Inner {
    records: Vec<LogRecord>,
    cursor: Option<String>,
    generation: u64,
}

/// Identifies the buffer contents a filter pass was computed from
///
/// `generation` changes on every `clear`, `len` on every append.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferVersion {
    pub generation: u64,
    pub len: usize,
}

/// Thread-safe, append-only store for one run's log records
///
/// A log provider pushes pages in arrival order; readers take snapshots and
/// filter them.
#[derive(Clone, Default)]
pub struct LogBuffer {
    inner: Arc<RwLock<Inner>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page of records and remember the provider's cursor
    pub fn push_page<I>(&self, records: I, cursor: Option<String>)
    where
        I: IntoIterator<Item = LogRecord>,
    {
        let mut inner = self.inner.write();
        inner.records.extend(records);
        if cursor.is_some() {
            inner.cursor = cursor;
        }
    }

    /// Append a single record
    pub fn push(&self, record: LogRecord) {
        self.inner.write().records.push(record);
    }

    /// Cursor of the last page received
    pub fn cursor(&self) -> Option<String> {
        self.inner.read().cursor.clone()
    }

    pub fn version(&self) -> BufferVersion {
        let inner = self.inner.read();
        BufferVersion {
            generation: inner.generation,
            len: inner.records.len(),
        }
    }

    /// Records plus the version they were read at, under one lock
    pub fn versioned_snapshot(&self) -> (BufferVersion, Vec<LogRecord>) {
        let inner = self.inner.read();
        let version = BufferVersion {
            generation: inner.generation,
            len: inner.records.len(),
        };
        (version, inner.records.clone())
    }

    /// Get all records (cloned for filtering)
    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.inner.read().records.clone()
    }

    /// Count displayable records per level
    pub fn level_counts<C: ClassifyLevel>(&self, classifier: &C) -> LevelCounts {
        let inner = self.inner.read();
        let mut counts = LevelCounts::default();

        for record in inner.records.iter().filter(|r| !r.kind.is_planning()) {
            *counts.by_level.entry(classifier.classify(record)).or_default() += 1;
        }

        counts
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Clear all records and the cursor, starting a new generation
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.records.clear();
        inner.cursor = None;
        inner.generation += 1;
    }
}

/// Counts per log level
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelCounts {
    by_level: BTreeMap<LogLevel, usize>,
}

impl LevelCounts {
    pub fn get(&self, level: LogLevel) -> usize {
        self.by_level.get(&level).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.by_level.values().sum()
    }
}
