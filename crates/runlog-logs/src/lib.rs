//! Run event-log processing for runlog
//!
//! This crate provides log filtering, query parsing, record reading,
//! buffering, and filter result caching.

mod buffer;
mod cache;
mod classify;
mod filter;
mod highlight;
mod parser;
mod query;

pub use buffer::{BufferVersion, LevelCounts, LogBuffer};
pub use cache::FilterCache;
pub use classify::{ClassifyLevel, DefaultClassifier, DefaultDisplayTypes, DisplayType};
pub use filter::{filter_logs, FilterEngine, FilteredLogs};
pub use highlight::MatchHighlighter;
pub use parser::{parse_record, parse_records, ParseError};
pub use query::{format_log_query, parse_log_query};

// Re-export types used in our public API
pub use runlog_types::{EventKind, FilterSpec, LogLevel, LogRecord, QueryTerm, QueryToken};
