//! Shared types for runlog
//!
//! This crate contains the run event-log record model and the filter
//! configuration used across the runlog crates.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Log Record Types
// ============================================================================

/// Log severity level
///
/// `Event` is the level of every structured record; the other levels only
/// occur on plain log messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Event,
}

impl LogLevel {
    /// All levels, in display order
    pub const ALL: [LogLevel; 6] = [
        Self::Debug,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Critical,
        Self::Event,
    ];

    /// Parse a level name, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            "event" => Some(Self::Event),
            _ => None,
        }
    }

    /// Upper-case display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Event => "EVENT",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record category, named after the event's `__typename`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    LogMessage,
    RunStart,
    RunSuccess,
    RunFailure,
    ExecutionStepStart,
    ExecutionStepSuccess,
    ExecutionStepFailure,
    Materialization,
    Observation,
    AssetCheckEvaluation,
    /// Planning bookkeeping, never shown
    AssetMaterializationPlanned,
    /// Planning bookkeeping, never shown
    AssetCheckEvaluationPlanned,
    Other(String),
}

impl EventKind {
    pub fn from_typename(s: &str) -> Self {
        match s {
            "LogMessageEvent" | "Log" => Self::LogMessage,
            "RunStartEvent" => Self::RunStart,
            "RunSuccessEvent" => Self::RunSuccess,
            "RunFailureEvent" => Self::RunFailure,
            "ExecutionStepStartEvent" => Self::ExecutionStepStart,
            "ExecutionStepSuccessEvent" => Self::ExecutionStepSuccess,
            "ExecutionStepFailureEvent" => Self::ExecutionStepFailure,
            "MaterializationEvent" => Self::Materialization,
            "ObservationEvent" => Self::Observation,
            "AssetCheckEvaluationEvent" => Self::AssetCheckEvaluation,
            "AssetMaterializationPlannedEvent" => Self::AssetMaterializationPlanned,
            "AssetCheckEvaluationPlannedEvent" => Self::AssetCheckEvaluationPlanned,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn typename(&self) -> &str {
        match self {
            Self::LogMessage => "LogMessageEvent",
            Self::RunStart => "RunStartEvent",
            Self::RunSuccess => "RunSuccessEvent",
            Self::RunFailure => "RunFailureEvent",
            Self::ExecutionStepStart => "ExecutionStepStartEvent",
            Self::ExecutionStepSuccess => "ExecutionStepSuccessEvent",
            Self::ExecutionStepFailure => "ExecutionStepFailureEvent",
            Self::Materialization => "MaterializationEvent",
            Self::Observation => "ObservationEvent",
            Self::AssetCheckEvaluation => "AssetCheckEvaluationEvent",
            Self::AssetMaterializationPlanned => "AssetMaterializationPlannedEvent",
            Self::AssetCheckEvaluationPlanned => "AssetCheckEvaluationPlannedEvent",
            Self::Other(name) => name,
        }
    }

    /// Kinds that only describe what a run plans to do
    pub fn is_planning(&self) -> bool {
        matches!(
            self,
            Self::AssetMaterializationPlanned | Self::AssetCheckEvaluationPlanned
        )
    }
}

/// A single record from a run's event log
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    /// Record category
    pub kind: EventKind,

    /// Emission time in milliseconds
    pub timestamp: i64,

    /// Producing step (None for run-level records)
    pub step_key: Option<String>,

    /// Raw event type, e.g. `ASSET_MATERIALIZATION`
    pub event_type: Option<String>,

    /// Free-text payload
    pub message: String,

    /// Explicit severity (log messages only)
    pub level: Option<LogLevel>,
}

impl LogRecord {
    /// Create a new record with minimal fields
    pub fn new(kind: EventKind, timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            kind,
            timestamp,
            step_key: None,
            event_type: None,
            message: message.into(),
            level: None,
        }
    }

    /// Create a plain log message at the given level
    pub fn message(level: LogLevel, timestamp: i64, message: impl Into<String>) -> Self {
        Self::new(EventKind::LogMessage, timestamp, message).with_level(level)
    }

    pub fn with_step_key(mut self, step_key: impl Into<String>) -> Self {
        self.step_key = Some(step_key.into());
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }
}

// ============================================================================
// Filter Types
// ============================================================================

/// What a query term is matched against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryToken {
    /// Step key belongs to the caller's relevant step set
    Scope,
    /// Step key equals the value
    Step,
    /// Display event type equals the value
    Type,
    /// Message contains the value, ignoring case
    Text,
}

impl QueryToken {
    /// Map a token name to its kind; unknown names are free text
    pub fn from_token(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "query" | "scope" => Self::Scope,
            "step" => Self::Step,
            "type" => Self::Type,
            _ => Self::Text,
        }
    }

    /// Token prefix used when rendering a term (None for free text)
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Self::Scope => Some("query"),
            Self::Step => Some("step"),
            Self::Type => Some("type"),
            Self::Text => None,
        }
    }
}

/// One `(token, value)` pair of a log query
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryTerm {
    pub token: QueryToken,
    pub value: String,
}

impl QueryTerm {
    pub fn new(token: QueryToken, value: impl Into<String>) -> Self {
        Self {
            token,
            value: value.into(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(QueryToken::Text, value)
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token.prefix() {
            Some(prefix) => write!(f, "{}:{}", prefix, self.value),
            None => f.write_str(&self.value),
        }
    }
}

/// The user's current log filter
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    /// Enabled flag per level (missing = disabled)
    pub levels: HashMap<LogLevel, bool>,

    /// Drop records emitted before this time (ms)
    pub since_time: Option<i64>,

    /// Query terms, all of which must match
    pub log_query: Vec<QueryTerm>,

    /// Show only text matches while a query is active
    pub hide_non_matches: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            levels: LogLevel::ALL.iter().map(|l| (*l, true)).collect(),
            since_time: None,
            log_query: Vec::new(),
            hide_non_matches: true,
        }
    }
}

impl FilterSpec {
    /// Enable exactly the given levels
    pub fn with_levels<I>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = LogLevel>,
    {
        self.levels = LogLevel::ALL.iter().map(|l| (*l, false)).collect();
        for level in levels {
            self.levels.insert(level, true);
        }
        self
    }

    pub fn with_since_time(mut self, since_time: i64) -> Self {
        self.since_time = Some(since_time);
        self
    }

    pub fn with_query(mut self, log_query: Vec<QueryTerm>) -> Self {
        self.log_query = log_query;
        self
    }

    pub fn with_hide_non_matches(mut self, hide: bool) -> Self {
        self.hide_non_matches = hide;
        self
    }

    pub fn set_level(&mut self, level: LogLevel, enabled: bool) {
        self.levels.insert(level, enabled);
    }

    pub fn level_enabled(&self, level: LogLevel) -> bool {
        self.levels.get(&level).copied().unwrap_or(false)
    }

    /// A query is active when its first term carries a value
    pub fn has_text_query(&self) -> bool {
        self.log_query
            .first()
            .is_some_and(|term| !term.value.is_empty())
    }
}
