use serde::Deserialize;
use thiserror::Error;

use runlog_types::{EventKind, LogLevel, LogRecord};

/// Errors raised while reading JSON-lines run logs
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: invalid record: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line}: invalid timestamp {value:?}")]
    Timestamp { line: usize, value: String },
}

/// Record as emitted by the event log API
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(rename = "__typename", alias = "kind")]
    typename: String,
    timestamp: RawTimestamp,
    step_key: Option<String>,
    event_type: Option<String>,
    message: Option<String>,
    level: Option<String>,
}

/// Timestamps arrive as numbers or as numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawTimestamp {
    fn to_millis(&self) -> Option<i64> {
        match self {
            Self::Int(ms) => Some(*ms),
            Self::Float(ms) => float_millis(*ms),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_millis))
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Int(ms) => ms.to_string(),
            Self::Float(ms) => ms.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Truncate to whole milliseconds; NaN, infinities and values outside `i64` are rejected
fn float_millis(ms: f64) -> Option<i64> {
    let range = (i64::MIN as f64)..(i64::MAX as f64);
    range.contains(&ms).then_some(ms as i64)
}

/// Parse a single JSON record
pub fn parse_record(line: &str) -> Result<LogRecord, ParseError> {
    parse_line(line, 1)
}

/// Parse JSON-lines text, skipping blank lines
pub fn parse_records(text: &str) -> Result<Vec<LogRecord>, ParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

fn parse_line(line: &str, lineno: usize) -> Result<LogRecord, ParseError> {
    let raw: RawRecord = serde_json::from_str(line.trim()).map_err(|source| ParseError::Json {
        line: lineno,
        source,
    })?;

    let timestamp = raw
        .timestamp
        .to_millis()
        .ok_or_else(|| ParseError::Timestamp {
            line: lineno,
            value: raw.timestamp.describe(),
        })?;

    Ok(LogRecord {
        kind: EventKind::from_typename(&raw.typename),
        timestamp,
        step_key: raw.step_key,
        event_type: raw.event_type,
        message: raw.message.unwrap_or_default(),
        // Unrecognized level names fall back to the classifier's default
        level: raw.level.as_deref().and_then(LogLevel::parse),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_message() {
        let record = parse_record(
            r#"{"__typename":"LogMessageEvent","timestamp":"1700000000123","stepKey":"load","message":"hello","level":"WARNING"}"#,
        )
        .unwrap();

        assert_eq!(record.kind, EventKind::LogMessage);
        assert_eq!(record.timestamp, 1_700_000_000_123);
        assert_eq!(record.step_key.as_deref(), Some("load"));
        assert_eq!(record.level, Some(LogLevel::Warning));
        assert_eq!(record.event_type, None);
    }

    #[test]
    fn test_parse_structured_event() {
        let record = parse_record(
            r#"{"kind":"MaterializationEvent","timestamp":42,"eventType":"ASSET_MATERIALIZATION","message":null}"#,
        )
        .unwrap();

        assert_eq!(record.kind, EventKind::Materialization);
        assert_eq!(record.timestamp, 42);
        assert_eq!(record.event_type.as_deref(), Some("ASSET_MATERIALIZATION"));
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_parse_records_skips_blank_lines() {
        let text = "{\"__typename\":\"RunStartEvent\",\"timestamp\":1}\n\n{\"__typename\":\"RunSuccessEvent\",\"timestamp\":\"2.5\"}\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].timestamp, 2);
    }

    #[test]
    fn test_bad_json_reports_line() {
        let text = "{\"__typename\":\"RunStartEvent\",\"timestamp\":1}\nnot json";
        match parse_records(text) {
            Err(ParseError::Json { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_bad_timestamp() {
        let err = parse_record(r#"{"__typename":"RunStartEvent","timestamp":"soon"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Timestamp { line: 1, .. }));
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_non_finite_timestamp() {
        for value in [r#""NaN""#, r#""inf""#, r#""-inf""#, r#""1e300""#, "1e300"] {
            let line = format!(r#"{{"__typename":"RunStartEvent","timestamp":{}}}"#, value);
            let err = parse_record(&line).unwrap_err();
            assert!(
                matches!(err, ParseError::Timestamp { line: 1, .. }),
                "{} gave {:?}",
                value,
                err
            );
        }

        let record = parse_record(r#"{"__typename":"RunStartEvent","timestamp":-1.5}"#).unwrap();
        assert_eq!(record.timestamp, -1);
    }
}
